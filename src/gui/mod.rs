/// GUI模块 - eframe 桌面界面
pub mod detail_window;
pub mod egui_app;
pub mod screener_table;
pub mod settings_panel;

pub use egui_app::ScreenerGui;
pub use screener_table::{ScreenerTable, TableAction};
pub use settings_panel::SettingsPanel;
