//! Browser data loading

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::error::{Error, Result};
use crate::sim::EquationBank;
use crate::tuning::Tuning;

fn fetch_error(url: &str, reason: impl std::fmt::Debug) -> Error {
    Error::Fetch {
        url: url.to_string(),
        reason: format!("{reason:?}"),
    }
}

/// GET a same-origin text file
pub async fn fetch_text(url: &str) -> Result<String> {
    let window = web_sys::window().ok_or_else(|| fetch_error(url, "no window"))?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| fetch_error(url, e))?;
    let resp: Response = resp.dyn_into().map_err(|e| fetch_error(url, e))?;
    if !resp.ok() {
        return Err(fetch_error(url, resp.status()));
    }
    let text = resp.text().map_err(|e| fetch_error(url, e))?;
    JsFuture::from(text)
        .await
        .map_err(|e| fetch_error(url, e))?
        .as_string()
        .ok_or_else(|| fetch_error(url, "body is not text"))
}

/// Load `equations.csv`, falling back to the built-in table
pub async fn load_equations(url: &str) -> EquationBank {
    match fetch_text(url).await {
        Ok(text) => EquationBank::from_csv_or_fallback(&text),
        Err(e) => {
            log::warn!("Error loading equations: {e}; using built-in equations");
            EquationBank::fallback()
        }
    }
}

/// Load optional `tuning.json`, falling back to defaults
pub async fn load_tuning(url: &str) -> Tuning {
    match fetch_text(url).await {
        Ok(text) => Tuning::from_json_or_default(&text),
        Err(e) => {
            log::info!("No tuning overrides ({e})");
            Tuning::default()
        }
    }
}
