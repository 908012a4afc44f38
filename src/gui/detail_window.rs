use eframe::egui;
use egui_extras::{Column, TableBuilder};
use egui_plot::{Line, Plot};

use crate::app::{DetailView, ScreenerApp};
use crate::gui::screener_table::cell_text;
use crate::screener::{column_label, UiStrings};

/// 交易对详情窗口: 最新值、价格曲线和历史快照表
pub fn show_detail_window(ctx: &egui::Context, app: &mut ScreenerApp) {
    let strings = app.strings();
    let mut open = true;

    if let Some(detail) = app.detail() {
        let title = match detail.detail.as_ref().and_then(|d| d.name.as_deref()) {
            Some(name) => format!("{} · {}", detail.symbol, name),
            None => detail.symbol.clone(),
        };

        egui::Window::new(title)
            .id(egui::Id::new("symbol_detail"))
            .open(&mut open)
            .resizable(true)
            .default_size([640.0, 520.0])
            .show(ctx, |ui| {
                if !detail.is_loaded() {
                    ui.spinner();
                    return;
                }
                show_latest(ui, detail, strings);
                ui.separator();
                show_price_plot(ui, detail);
                ui.separator();
                show_history(ui, detail, strings);
            });
    }

    if !open {
        app.close_detail();
    }
}

fn show_latest(ui: &mut egui::Ui, detail: &DetailView, strings: &UiStrings) {
    ui.strong(strings.latest_title);
    if detail.latest.is_empty() {
        ui.label(strings.empty_history);
        return;
    }

    egui::Grid::new("detail_latest")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            for cell in &detail.latest {
                ui.label(column_label(cell.column));
                ui.label(cell_text(&cell.text, cell.delta));
                ui.end_row();
            }
        });
}

fn show_price_plot(ui: &mut egui::Ui, detail: &DetailView) {
    let points = detail.price_series();
    if points.len() < 2 {
        return;
    }

    Plot::new("detail_price_plot")
        .height(160.0)
        .show_axes([false, true])
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).color(egui::Color32::WHITE).width(1.5).name("price"));
        });
}

fn show_history(ui: &mut egui::Ui, detail: &DetailView, strings: &UiStrings) {
    ui.strong(strings.history_title);
    let history = &detail.history;
    if history.is_empty() {
        ui.label(strings.empty_history);
        return;
    }

    ui.push_id("detail_history", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(80.0), history.headers.len())
            .max_scroll_height(240.0)
            .header(22.0, |mut header| {
                for h in &history.headers {
                    header.col(|ui| {
                        ui.strong(&h.label);
                    });
                }
            })
            .body(|mut body| {
                // 最新的快照放在最上面
                for row_view in history.rows.iter().rev() {
                    body.row(20.0, |mut row| {
                        for cell in &row_view.cells {
                            row.col(|ui| {
                                ui.label(cell_text(&cell.text, cell.delta));
                            });
                        }
                    });
                }
            });
    });
}
