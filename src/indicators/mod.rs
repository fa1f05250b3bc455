//! Transient tool-activity indicators keyed by `(agent, tool)`.

pub mod manager;
pub mod tool_table;

pub use manager::{
    IndicatorChange, IndicatorHandle, IndicatorKey, IndicatorManager, IndicatorPhase,
    IndicatorTimings, IndicatorView,
};
pub use tool_table::{describe, humanize, KnownTool, ToolDescriptor};
