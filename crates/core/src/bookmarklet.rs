//! Personal bookmarklet generation.
//!
//! Serializes a GitHub token + repository configuration into a base64
//! payload and embeds it in a self-contained `javascript:` URI that
//! extracts the current page, converts it to markdown, and commits it via
//! the Contents API — all inline, no extension required.
//!
//! The base64 blob is obfuscation, not encryption: anyone holding the
//! bookmarklet text can decode the token. Do not treat the artifact as a
//! secret store.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::Validation;
use crate::github::split_slug;
use crate::{PrismError, Result};

/// Configuration embedded in a personal bookmarklet.
///
/// `github_token` and `github_repo` are mandatory; the repo must be an
/// `owner/repo` slug. Field names serialize in camelCase so the embedded
/// blob matches what the generated script reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatConfig {
    pub github_token: String,
    pub github_repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
}

/// Validate a bookmarklet configuration.
///
/// Reports every problem at once, synchronously, before any generation
/// or network activity.
pub fn validate_configuration(config: &PatConfig) -> Validation {
    let mut errors = Vec::new();

    if config.github_token.trim().is_empty() {
        errors.push("GitHub token is required".to_string());
    }

    if config.github_repo.trim().is_empty() {
        errors.push("GitHub repository is required".to_string());
    } else if split_slug(&config.github_repo).is_err() {
        errors.push(format!(
            "Repository must be in owner/repo format, got {:?}",
            config.github_repo
        ));
    }

    Validation::from_errors(errors)
}

// The script around the config blob. Split where the base64 payload is
// spliced in, so no token text ever appears outside the encoded blob.
// Commit flow mirrors the Contents API client: GET for the existing sha,
// then PUT carrying it. Feedback is a transient injected element, never a
// blocking dialog.
const SCRIPT_PREFIX: &str = "javascript:(function(){var c=JSON.parse(atob('";

const SCRIPT_SUFFIX: &str = "'));\
var r=document.querySelector('main,article')||document.body;\
var s=(document.title||'capture').toLowerCase().replace(/[^a-z0-9]+/g,'-').replace(/^-+|-+$/g,'')||'untitled';\
var d=new Date().toISOString().slice(0,10);\
var p=(c.defaultFolder?c.defaultFolder.replace(/^\\/+|\\/+$/g,'')+'/':'')+d+'-'+s+'.md';\
var md='# '+(document.title||'Untitled')+'\\n\\n'+r.innerText;\
var fm='---\\ntitle: \"'+(document.title||'')+'\"\\nurl: \"'+location.href+'\"\\ncaptured: \"'+new Date().toISOString()+'\"\\n---\\n\\n';\
var u='https://api.github.com/repos/'+c.githubRepo+'/contents/'+p;\
var h={'Authorization':'Bearer '+c.githubToken,'Accept':'application/vnd.github+json','Content-Type':'application/json'};\
var toast=function(m,ok){var n=document.createElement('div');n.textContent=m;\
n.style.cssText='position:fixed;top:16px;right:16px;z-index:2147483647;padding:10px 14px;border-radius:6px;font:14px/1.4 sans-serif;color:#fff;background:'+(ok?'#16a34a':'#dc2626');\
document.body.appendChild(n);setTimeout(function(){n.remove();},4000);};\
fetch(u,{headers:h}).then(function(g){return g.ok?g.json():null;}).catch(function(){return null;})\
.then(function(e){var b={message:c.commitMessage||('PrismWeave capture: '+(document.title||p)),content:btoa(unescape(encodeURIComponent(fm+md)))};\
if(e&&e.sha){b.sha=e.sha;}\
return fetch(u,{method:'PUT',headers:h,body:JSON.stringify(b)});})\
.then(function(x){toast(x.ok?'PrismWeave: saved '+p:'PrismWeave: commit failed ('+x.status+')',x.ok);})\
.catch(function(){toast('PrismWeave: network error',false);});})();";

/// Generate a personal bookmarklet from a validated configuration.
///
/// The configuration is serialized to JSON, base64-encoded, and embedded
/// in the script; the plaintext token never appears outside the blob.
pub fn generate_personal_bookmarklet(config: &PatConfig) -> Result<String> {
    let validation = validate_configuration(config);
    if !validation.valid {
        return Err(PrismError::Validation(validation.errors.join("; ")));
    }

    let payload = serde_json::to_string(config)?;
    let blob = BASE64.encode(payload.as_bytes());

    Ok([SCRIPT_PREFIX, blob.as_str(), SCRIPT_SUFFIX].concat())
}

/// Recover the configuration embedded in a bookmarklet.
///
/// Locates the base64 blob, decodes, and parses it. Returns `None` —
/// never an error — when the input does not match the expected shape or
/// the decoded configuration is invalid.
pub fn extract_config_from_bookmarklet(text: &str) -> Option<PatConfig> {
    let start = text.find("atob('")? + "atob('".len();
    let len = text[start..].find("')")?;
    let blob = &text[start..start + len];

    let decoded = BASE64.decode(blob).ok()?;
    let json = String::from_utf8(decoded).ok()?;
    let config: PatConfig = serde_json::from_str(&json).ok()?;

    if validate_configuration(&config).valid { Some(config) } else { None }
}
