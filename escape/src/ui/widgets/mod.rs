//! TUI widgets for the escape room

pub mod input;
pub mod narrative;
pub mod scenario_list;
pub mod status_panel;

pub use input::InputWidget;
pub use narrative::NarrativeWidget;
pub use scenario_list::ScenarioListWidget;
pub use status_panel::StatusPanelWidget;
