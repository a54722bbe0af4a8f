use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;

pub mod aggregate;
pub mod batch;
pub mod categories;
pub mod error;
pub mod geo;
pub mod group;
pub mod history;
pub mod lexicon;
pub mod message;
pub mod patterns;
pub mod profile;
pub mod report;
pub mod sentiment;
pub mod source;
pub mod style;
pub mod tally;
pub mod target;
pub mod topics;
pub mod vocabulary;
mod text;

#[cfg(test)]
mod testing;

pub use aggregate::{fold_messages, fold_stream, Aggregator};
pub use batch::{run_group, run_report, AnalysisKind, AnalysisSettings, ReportTier};
pub use error::{AnalysisError, LexiconError, Result, SourceError};
pub use lexicon::{CompiledLexicons, Lexicons};
pub use message::{Media, MediaKind, Message, Reaction};
pub use profile::UserProfile;
pub use report::{render_text, ProfileReport, Slot};
pub use source::{resolve_target, ConversationExport, Lookup, MemorySource, MessageSource};
pub use tally::Tally;
pub use target::TargetQuery;

// Performance timing helpers, enabled via `--features timing` for debugging.
#[cfg(all(target_arch = "wasm32", feature = "timing"))]
fn perf_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

#[cfg(all(target_arch = "wasm32", feature = "timing"))]
macro_rules! log_step {
    ($label:expr, $start:expr) => {
        web_sys::console::log_1(
            &format!("[wasm] {} took {:.1}ms", $label, perf_now() - $start).into(),
        );
    };
}

#[cfg(target_arch = "wasm32")]
fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
fn now() -> DateTime<Utc> {
    Utc::now()
}

#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Analyze a conversation export (`{"profile": .., "messages": [..]}`) in
/// the browser and return the report object.
#[wasm_bindgen]
pub fn analyze_messages(raw: &str, tier: &str) -> std::result::Result<JsValue, JsValue> {
    let report = summarize(raw, tier, now()).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&report).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn analyze_messages_text(raw: &str, tier: &str) -> std::result::Result<String, JsValue> {
    let report = summarize(raw, tier, now()).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(render_text(&report))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn analyze_messages_native(raw: &str, tier: &str) -> std::result::Result<String, String> {
    let report = summarize(raw, tier, now()).map_err(|e| e.to_string())?;
    report.to_json_pretty().map_err(|e| e.to_string())
}

/// Run a whole tier over an in-memory export with the built-in lexicons.
pub fn summarize(raw: &str, tier: &str, searched_at: DateTime<Utc>) -> Result<ProfileReport> {
    #[cfg(all(target_arch = "wasm32", feature = "timing"))]
    let t0 = perf_now();

    let export = ConversationExport::from_json_str(raw)?;
    #[cfg(all(target_arch = "wasm32", feature = "timing"))]
    log_step!("parse_export", t0);

    if export.messages.is_empty() {
        return Err(AnalysisError::Empty);
    }

    let tier: ReportTier = tier.parse().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to the complete tier");
        ReportTier::Complete
    });
    let settings = AnalysisSettings::for_tier(tier);
    let lexicons = CompiledLexicons::builtin();
    let profile = export.profile.clone();
    let source = export.into_source();

    #[cfg(all(target_arch = "wasm32", feature = "timing"))]
    let t1 = perf_now();
    // In-memory streams are always ready, so this never parks the thread.
    let report = futures::executor::block_on(run_report(
        &source,
        &profile,
        &lexicons,
        &settings,
        searched_at,
    ));
    #[cfg(all(target_arch = "wasm32", feature = "timing"))]
    log_step!("run_report", t1);

    Ok(report)
}
