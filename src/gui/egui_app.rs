use std::time::Duration;

use eframe::egui;

use crate::app::ScreenerApp;
use crate::gui::detail_window::show_detail_window;
use crate::gui::screener_table::{ScreenerTable, TableAction};
use crate::gui::settings_panel::SettingsPanel;
use crate::screener::MarketType;

pub struct ScreenerGui {
    app: ScreenerApp,
    table: ScreenerTable,
    settings: SettingsPanel,
    search: String,
    repaint_interval: Duration,
}

impl ScreenerGui {
    pub fn new(app: ScreenerApp) -> Self {
        let search = app.query().filter("search").unwrap_or_default().to_string();
        Self {
            app,
            table: ScreenerTable::new(),
            settings: SettingsPanel::new(),
            search,
            repaint_interval: Duration::from_millis(100),
        }
    }

    /// 指针按下、拖动、滚动或按键都算作交互, 轮询在静默期内暂停
    fn track_interaction(&self, ctx: &egui::Context) {
        let busy = ctx.input(|i| {
            i.pointer.any_down()
                || i.pointer.is_decidedly_dragging()
                || i.raw_scroll_delta != egui::Vec2::ZERO
                || !i.keys_down.is_empty()
        });
        if busy {
            self.app.note_interaction();
        }
    }

    fn show_top_bar(&mut self, ui: &mut egui::Ui) {
        let strings = self.app.strings();

        egui::menu::bar(ui, |ui| {
            if ui.button(strings.settings_button).clicked() {
                self.settings.toggle();
            }
            ui.separator();

            ui.label(strings.market_label);
            let mut market_type = self.app.query().market_type;
            ui.selectable_value(&mut market_type, MarketType::Futures, "Futures");
            ui.selectable_value(&mut market_type, MarketType::Spot, "Spot");
            self.app.set_market_type(market_type);
            ui.separator();

            let response = ui.add(egui::TextEdit::singleline(&mut self.search).hint_text("BTC").desired_width(120.0));
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                let search = self.search.clone();
                self.app.set_filter("search", &search);
            }
            ui.separator();

            if let Some(at) = self.app.last_update() {
                ui.colored_label(
                    egui::Color32::GRAY,
                    format!("{}: {}", strings.updated_label, at.format("%H:%M:%S")),
                );
            }
            ui.colored_label(egui::Color32::GRAY, format!("{} rows", self.app.view().rows.len()));
        });
    }
}

impl eframe::App for ScreenerGui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.app.pump();
        self.track_interaction(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.show_top_bar(ui);
        });

        let action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let empty_text = self.app.strings().empty_table;
                self.table.show(ui, self.app.view(), empty_text)
            })
            .inner;

        match action {
            Some(TableAction::Sort(column)) => self.app.click_header(&column),
            Some(TableAction::OpenDetail(symbol)) => self.app.open_detail(&symbol),
            None => {}
        }

        self.settings.show(ctx, &mut self.app);
        show_detail_window(ctx, &mut self.app);

        ctx.request_repaint_after(self.repaint_interval);
    }
}

impl Drop for ScreenerGui {
    fn drop(&mut self) {
        self.app.stop();
    }
}
