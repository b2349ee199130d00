use crate::common::{
    CONFIRM_PLAYER_DELETE_MESSAGE, CONFIRM_REMOVE_MESSAGE, EMPTY_GALLERY_MESSAGE,
    NO_MATCH_MESSAGE, VIDEO_ACCEPT,
};
use crate::models::notice::Notice;
use crate::view::controller::LibraryController;
use crate::view::gallery::{Card, GalleryBody, GalleryView};
use crate::view::player::OpenVideo;

pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = r#"
body{margin:0;font-family:system-ui,sans-serif;background:#0b1220;color:#e6edf7}
header{display:flex;gap:12px;align-items:center;padding:16px 24px;background:#111a2e}
header h1{font-size:20px;margin:0 auto 0 0}
input[type=search]{padding:8px 10px;border-radius:8px;border:1px solid #2a3a5c;background:#0b1220;color:inherit;min-width:240px}
.btn{padding:6px 12px;border-radius:8px;border:1px solid #2a3a5c;background:#1a2744;color:inherit;cursor:pointer;text-decoration:none;font-size:14px}
.drop{margin:16px 24px;padding:24px;border:2px dashed #2a3a5c;border-radius:12px;text-align:center;color:#9fb0c9}
.drop.dragover{border-color:#5b8def;color:#e6edf7}
.notices{margin:0 24px}
.notice{padding:8px 12px;border-radius:8px;margin-top:8px;background:#2a2340}
.notice.error{background:#4a1f2a}
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(240px,1fr));gap:16px;padding:16px 24px}
.card{background:#111a2e;border-radius:12px;overflow:hidden}
.thumb video{width:100%;aspect-ratio:16/9;background:#000;display:block}
.meta{display:flex;justify-content:space-between;gap:8px;padding:10px}
.title{font-weight:600}
.small{font-size:12px;color:#9fb0c9}
.actions{display:flex;gap:6px;align-items:start}
.actions form{margin:0}
.empty{grid-column:1/-1;color:#9fb0c9;padding:40px;text-align:center}
.overlay{position:fixed;inset:0;background:rgba(0,0,0,.85);display:flex;align-items:center;justify-content:center}
.player{width:min(960px,92vw)}
.player video{width:100%;max-height:75vh;background:#000}
.player .bar{display:flex;justify-content:space-between;align-items:center;margin-top:8px}
"#;

const SCRIPT: &str = r#"
(function(){
  const dropZone = document.getElementById('dropZone');
  const fileInput = document.getElementById('fileInput');
  const search = document.getElementById('search');
  async function handleFiles(files){
    if(!files.length) return;
    const form = new FormData();
    for(const f of files){
      const title = f.type.startsWith('video/') ? (prompt('Title for this video (optional):', f.name) || '') : '';
      form.append('file', f, f.name);
      form.append('title', title);
    }
    await fetch('/upload', {method:'POST', body:form});
    location.reload();
  }
  ['dragenter','dragover','dragleave','drop'].forEach(ev => dropZone.addEventListener(ev, e => {e.preventDefault(); e.stopPropagation();}));
  dropZone.addEventListener('dragover', () => dropZone.classList.add('dragover'));
  dropZone.addEventListener('dragleave', () => dropZone.classList.remove('dragover'));
  dropZone.addEventListener('drop', e => { dropZone.classList.remove('dragover'); handleFiles(Array.from(e.dataTransfer.files)); });
  document.getElementById('newUpload').addEventListener('click', () => fileInput.click());
  fileInput.addEventListener('change', () => { handleFiles(Array.from(fileInput.files)); fileInput.value = ''; });
  let timer = null;
  search.addEventListener('input', () => { clearTimeout(timer); timer = setTimeout(() => search.form.submit(), 250); });
  search.setSelectionRange(search.value.length, search.value.length);
})();
"#;

/// The whole library page for the controller's current state.
pub fn render_page(controller: &LibraryController, notices: &[Notice]) -> String {
    let view = controller.gallery();
    let mut html = String::with_capacity(4096);
    html.push_str("<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">");
    html.push_str("<title>DemoTube</title><style>");
    html.push_str(STYLE);
    html.push_str("</style></head><body>");

    html.push_str(&format!(
        "<header><h1>DemoTube</h1>\
         <form method=\"get\" action=\"/\"><input id=\"search\" type=\"search\" name=\"q\" \
         placeholder=\"Search title or filename\" value=\"{}\" autofocus></form>\
         <button id=\"newUpload\" class=\"btn\" type=\"button\">Upload</button>\
         <input id=\"fileInput\" type=\"file\" accept=\"{}\" multiple hidden></header>",
        escape_html(view.filter.query()),
        VIDEO_ACCEPT
    ));
    html.push_str("<div id=\"dropZone\" class=\"drop\">Drop video files here</div>");

    render_notices(&mut html, notices);
    render_gallery(&mut html, view);
    if let Some(video) = controller.now_playing() {
        render_overlay(&mut html, video);
    }

    html.push_str("<script>");
    html.push_str(SCRIPT);
    html.push_str("</script></body></html>");
    html
}

fn render_notices(html: &mut String, notices: &[Notice]) {
    if notices.is_empty() {
        return;
    }
    html.push_str("<div class=\"notices\" role=\"alert\">");
    for notice in notices {
        let class = if notice.is_error() {
            "notice error"
        } else {
            "notice"
        };
        html.push_str(&format!(
            "<div class=\"{}\">{}</div>",
            class,
            escape_html(&notice.to_string())
        ));
    }
    html.push_str("</div>");
}

pub fn render_gallery(html: &mut String, view: &GalleryView) {
    html.push_str("<div id=\"videoGrid\" class=\"grid\">");
    match &view.body {
        GalleryBody::Empty => {
            html.push_str(&format!("<div class=\"empty\">{}</div>", EMPTY_GALLERY_MESSAGE));
        }
        GalleryBody::NoMatches => {
            html.push_str(&format!("<div class=\"empty\">{}</div>", NO_MATCH_MESSAGE));
        }
        GalleryBody::Cards(cards) => {
            for card in cards {
                render_card(html, card);
            }
        }
    }
    html.push_str("</div>");
}

fn render_card(html: &mut String, card: &Card) {
    html.push_str(&format!(
        "<div class=\"card\" data-id=\"{id}\">\
         <div class=\"thumb\"><video src=\"{src}\" muted playsinline preload=\"metadata\"></video></div>\
         <div class=\"meta\"><div><div class=\"title\">{title}</div><div class=\"small\">{filename}</div></div>\
         <div class=\"actions\"><a class=\"btn\" href=\"/play/{id}\">Play</a>\
         <form method=\"post\" action=\"/videos/{id}/remove\" onsubmit=\"return confirm('{confirm}')\">\
         <input type=\"hidden\" name=\"confirmed\" value=\"true\"><button class=\"btn\">Remove</button></form>\
         </div></div></div>",
        id = card.id,
        src = escape_html(&card.preview_url),
        title = escape_html(&card.title),
        filename = escape_html(&card.filename),
        confirm = CONFIRM_REMOVE_MESSAGE,
    ));
}

fn render_overlay(html: &mut String, video: &OpenVideo) {
    html.push_str(&format!(
        "<div id=\"overlay\" class=\"overlay show\"><div class=\"player\">\
         <video id=\"playerVideo\" src=\"{src}\" controls autoplay></video>\
         <div class=\"bar\"><div><div id=\"playerTitle\" class=\"title\">{title}</div>\
         <div id=\"playerFilename\" class=\"small\">{filename}</div></div>\
         <div class=\"actions\">\
         <form method=\"post\" action=\"/player/delete\" onsubmit=\"return confirm('{confirm}')\">\
         <input type=\"hidden\" name=\"confirmed\" value=\"true\"><button id=\"deleteBtn\" class=\"btn\">Delete</button></form>\
         <form method=\"post\" action=\"/player/close\"><button id=\"closePlayer\" class=\"btn\">Close</button></form>\
         </div></div></div></div>",
        src = escape_html(&video.content_url()),
        title = escape_html(&video.title),
        filename = escape_html(&video.filename),
        confirm = CONFIRM_PLAYER_DELETE_MESSAGE,
    ));
}

/// Served in place of the library when the store could not be opened.
pub fn render_unavailable(reason: &str) -> String {
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>DemoTube</title>\
         <style>{}</style></head><body><header><h1>DemoTube</h1></header>\
         <div class=\"notices\" role=\"alert\"><div class=\"notice error\">{}</div></div>\
         </body></html>",
        STYLE,
        escape_html(
            &Notice::StorageUnavailable {
                reason: reason.to_string()
            }
            .to_string()
        )
    )
}
