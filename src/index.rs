//! Voice/vibe catalogue and the landing page built from it.

use serde::Serialize;
use serde_json::Value;

use crate::prompt::{default_prompt, Prompt};

pub const VOICES: [&str; 11] = [
    "Alloy", "Ash", "Ballad", "Coral", "Echo", "Fable", "Onyx", "Nova", "Sage", "Shimmer", "Verse",
];

pub const VIBES: [&str; 5] = [
    "Santa",
    "True Crime Buff",
    "Old-Timey",
    "Robot",
    "Eternal Optimist",
];

/// Posts the form to the generate endpoint and plays the returned audio.
const FORM_SCRIPT: &str = r#"<script>
const form = document.getElementById("tts-form");
const player = document.getElementById("player");
const statusLine = document.getElementById("status");
form.addEventListener("submit", async (event) => {
  event.preventDefault();
  const data = new FormData(form);
  const prompt = {};
  for (const field of form.querySelectorAll("fieldset textarea")) {
    prompt[field.name] = field.value;
  }
  statusLine.textContent = "Generating...";
  try {
    const resp = await fetch("/api/generate-tts", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({
        text: data.get("text"),
        voice: data.get("voice"),
        vibe: data.get("vibe"),
        prompt,
      }),
    });
    const body = await resp.json();
    if (!body.success) {
      statusLine.textContent = body.error;
      return;
    }
    statusLine.textContent = "";
    player.src = body.audioUrl;
    player.play();
  } catch (err) {
    statusLine.textContent = String(err);
  }
});
</script>"#;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalogue {
    pub voices: Vec<&'static str>,
    pub vibes: Vec<&'static str>,
    pub default_prompt: Prompt,
}

impl Default for Catalogue {
    fn default() -> Self {
        Self {
            voices: VOICES.to_vec(),
            vibes: VIBES.to_vec(),
            default_prompt: default_prompt(),
        }
    }
}

impl Catalogue {
    pub fn render_html(&self) -> String {
        let voices: String = self
            .voices
            .iter()
            .map(|v| format!("<option value=\"{0}\">{0}</option>", escape(v)))
            .collect();
        let vibes: String = self
            .vibes
            .iter()
            .map(|v| format!("<option value=\"{0}\">{0}</option>", escape(v)))
            .collect();
        let prompt_fields: String = self
            .default_prompt
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!(
                    "<label>{0}<textarea name=\"{0}\">{1}</textarea></label>\n",
                    escape(key),
                    escape(&text)
                )
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>voicegen</title>
</head>
<body>
<h1>voicegen</h1>
<form id="tts-form">
<label>Text<textarea name="text" maxlength="1003"></textarea></label>
<label>Voice<select name="voice">{voices}</select></label>
<label>Vibe<select name="vibe">{vibes}</select></label>
<fieldset>
<legend>Prompt</legend>
{prompt_fields}</fieldset>
<button type="submit">Generate</button>
</form>
<p id="status"></p>
<audio id="player" controls></audio>
{FORM_SCRIPT}
</body>
</html>
"#
        )
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
