// src/components/file_upload.rs
use super::{escape_html, fill_template};

pub const ACCEPTED_EXTENSIONS: &str = ".pdf,.docx,.doc,.txt";

/// Drag-and-drop file picker. The selected `File` is kept in
/// `window.selectedFiles[input_id]` and `onFileSelected(file)` is called
/// on every change (with `null` when removed).
pub fn render_file_upload(input_id: &str) -> String {
    const TEMPLATE: &str = r###"
<div class="file-upload">
    <input type="file" id="{{ID}}" accept="{{ACCEPT}}" style="display: none;">
    <div class="file-drop" id="{{ID}}-drop">
        <div style="font-size: 2rem;">⬆️</div>
        <p style="font-weight: 500; margin: 0.25rem 0;">Drag and drop your file here or click to browse</p>
        <p class="muted" style="font-size: 0.8rem;">PDF, DOCX, or TXT files up to 50MB</p>
    </div>
    <div class="file-selected" id="{{ID}}-selected">
        <span id="{{ID}}-name"></span>
        <span>
            <button type="button" class="button outline" id="{{ID}}-change">Change</button>
            <button type="button" class="button outline" id="{{ID}}-remove">✕</button>
        </span>
    </div>
</div>
<script>
    (function () {
        window.selectedFiles = window.selectedFiles || {};
        const input = document.getElementById('{{ID}}');
        const drop = document.getElementById('{{ID}}-drop');
        const selected = document.getElementById('{{ID}}-selected');
        const nameLabel = document.getElementById('{{ID}}-name');

        function select(file) {
            window.selectedFiles['{{ID}}'] = file;
            if (file) {
                nameLabel.textContent = file.name;
                drop.style.display = 'none';
                selected.style.display = 'flex';
            } else {
                input.value = '';
                drop.style.display = 'flex';
                selected.style.display = 'none';
            }
            if (typeof window.onFileSelected === 'function') {
                window.onFileSelected(file);
            }
        }

        ['dragenter', 'dragover'].forEach((type) => drop.addEventListener(type, (e) => {
            e.preventDefault();
            e.stopPropagation();
            drop.classList.add('active');
        }));
        drop.addEventListener('dragleave', (e) => {
            e.preventDefault();
            e.stopPropagation();
            drop.classList.remove('active');
        });
        drop.addEventListener('drop', (e) => {
            e.preventDefault();
            e.stopPropagation();
            drop.classList.remove('active');
            if (e.dataTransfer.files && e.dataTransfer.files[0]) {
                select(e.dataTransfer.files[0]);
            }
        });
        drop.addEventListener('click', () => input.click());
        input.addEventListener('change', (e) => {
            if (e.target.files && e.target.files[0]) {
                select(e.target.files[0]);
            }
        });
        document.getElementById('{{ID}}-change').addEventListener('click', () => input.click());
        document.getElementById('{{ID}}-remove').addEventListener('click', () => select(null));
    })();
</script>
"###;

    fill_template(TEMPLATE, &[("ID", escape_html(input_id).as_str()), ("ACCEPT", ACCEPTED_EXTENSIONS)])
}
