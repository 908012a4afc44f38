use eframe::egui;

use crate::app::ScreenerApp;
use crate::screener::{columns_in, ColumnCategory, Language};

/// 列设置窗口: 按类别列出所有列, 勾选框绑定到持久化的可见列集合
#[derive(Default)]
pub struct SettingsPanel {
    pub open: bool,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn show(&mut self, ctx: &egui::Context, app: &mut ScreenerApp) {
        if !self.open {
            return;
        }

        let strings = app.strings();
        let mut open = self.open;

        egui::Window::new(strings.settings_title)
            .open(&mut open)
            .resizable(true)
            .default_width(520.0)
            .show(ctx, |ui| {
                ui.label(strings.settings_note);
                ui.separator();

                egui::ScrollArea::vertical().max_height(420.0).show(ui, |ui| {
                    egui::Grid::new("settings_categories")
                        .num_columns(ColumnCategory::ALL.len())
                        .spacing([16.0, 4.0])
                        .show(ui, |ui| {
                            for category in ColumnCategory::ALL {
                                ui.vertical(|ui| {
                                    ui.strong(category.title());
                                    for spec in columns_in(category) {
                                        let mut visible = app.visibility().is_visible(spec.id);
                                        if ui.checkbox(&mut visible, spec.label()).changed() {
                                            app.set_column_visible(spec.id, visible);
                                        }
                                    }
                                });
                            }
                            ui.end_row();
                        });
                });

                ui.separator();
                ui.horizontal(|ui| {
                    ui.label(strings.reset_label);
                    if ui.button(strings.reset_button).clicked() {
                        app.reset_columns();
                    }
                });

                ui.horizontal(|ui| {
                    ui.label(strings.language_label);
                    let mut language = app.language();
                    egui::ComboBox::from_id_source("language_select")
                        .selected_text(language.native_name())
                        .show_ui(ui, |ui| {
                            for option in Language::ALL {
                                ui.selectable_value(&mut language, option, option.native_name());
                            }
                        });
                    app.set_language(language);
                });
            });

        self.open = open;
    }
}
