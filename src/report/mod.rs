pub mod diff;
pub mod html;

pub use diff::{diff_lines, DiffColumns, SourceLine, TargetLine};
pub use html::{render_report, EMPTY_REPORT_MESSAGE};
