use crate::{
    camera::snapshot::CapturedImage,
    core::state::{CaptureState, CaptureStatus},
};

const STYLE: &str = r#"
.webcam-container { position: relative; width: 100%; max-width: 400px; margin: 0 auto; }
.webcam-video, .preview-img { display: block; width: 100%; border-radius: 10px; background: #000; }
.webcam-button, .webcam-torch-button {
  position: absolute; left: 50%; transform: translateX(-50%);
  background-color: #fff; color: #333; border: none; border-radius: 20px;
  padding: 10px 20px; font-size: 16px; cursor: pointer;
  box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1);
}
.webcam-button { bottom: 20px; }
.webcam-torch-button { bottom: 80px; }
.webcam-button.dark, .webcam-torch-button.dark { background-color: #333; color: #fff; }
@media (max-width: 767px) {
  .webcam-video, .preview-img { height: 100vh; object-fit: cover; border-radius: 0; }
}
"#;

const HTMX: &str = "https://unpkg.com/htmx.org@1.9.12";

pub fn page(title: &str, widget: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n<script src=\"{HTMX}\"></script>\n\
         </head>\n<body>\n{widget}\n</body>\n</html>\n",
        escape(title)
    )
}

fn action_button(class: &str, action: &str, label: &str) -> String {
    format!(
        "<button class=\"{class}\" hx-post=\"{action}\" hx-target=\"#webcam-capture\" \
         hx-swap=\"outerHTML\">{label}</button>"
    )
}

/// Controls follow the component state: still image and Reset once captured,
/// Capture Image while live, Start Webcam otherwise.
pub fn full_widget(status: &CaptureStatus, image: Option<&CapturedImage>) -> String {
    let mut body = String::new();
    match (status.state, image) {
        (CaptureState::Captured, Some(image)) => {
            body.push_str(&format!(
                "<img class=\"preview-img captured-image\" src=\"{}\" width=\"{}\" height=\"{}\" alt=\"Captured image\">",
                image.data_uri, image.width, image.height
            ));
            body.push_str(&action_button("webcam-button", "/full/reset", "Reset"));
        }
        (state, _) => {
            let torch_label = if status.torch_on { "Torch Off" } else { "Torch On" };
            if state == CaptureState::Live {
                body.push_str(&format!(
                    "<img class=\"webcam-video\" src=\"/full/preview?g={}\" alt=\"Live camera preview\">",
                    status.generation
                ));
            } else {
                body.push_str("<div class=\"webcam-video\" style=\"aspect-ratio: 4 / 3\"></div>");
            }
            body.push_str(&action_button(
                "webcam-torch-button dark",
                "/full/torch",
                torch_label,
            ));
            if state == CaptureState::Live {
                body.push_str(&action_button(
                    "webcam-button",
                    "/full/capture",
                    "Capture Image",
                ));
            } else {
                body.push_str(&action_button(
                    "webcam-button dark",
                    "/full/start",
                    "Start Webcam",
                ));
            }
        }
    }

    format!(
        "<div id=\"webcam-capture\" class=\"webcam-container\" data-state=\"{}\">{body}</div>",
        state_name(status.state)
    )
}

pub fn simple_widget(live: bool) -> String {
    let preview = if live {
        "<img class=\"webcam-video\" src=\"/simple/preview\" width=\"1280\" height=\"720\" alt=\"Live camera preview\">"
    } else {
        "<div class=\"webcam-video\" style=\"aspect-ratio: 16 / 9\"></div>"
    };
    format!(
        "<div id=\"webcam-simple\">{preview}\
         <button hx-post=\"/simple/capture\" hx-swap=\"none\">Capture photo</button></div>"
    )
}

fn state_name(state: CaptureState) -> &'static str {
    match state {
        CaptureState::Idle => "idle",
        CaptureState::Live => "live",
        CaptureState::Captured => "captured",
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
