//! Output generation for the report views.
//!
//! # Submodules
//!
//! - [`console`]: plain-text listings printed by the CLI
//! - [`html`]: the static, self-contained HTML report
//!
//! Both only format data the views have already selected and ordered.

pub mod console;
pub mod html;
