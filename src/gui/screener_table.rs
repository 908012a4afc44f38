use eframe::egui;
use egui_extras::{Column, TableBuilder};

use crate::screener::{DeltaState, TableView};

/// 表格上的用户操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAction {
    /// 点击了可排序的表头
    Sort(String),
    /// 点击了交易对, 打开详情
    OpenDetail(String),
}

pub const UP_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 255, 120);
pub const DOWN_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 120, 120);

pub fn delta_color(delta: DeltaState) -> Option<egui::Color32> {
    match delta {
        DeltaState::Up => Some(UP_COLOR),
        DeltaState::Down => Some(DOWN_COLOR),
        DeltaState::Neutral => None,
    }
}

/// 单元格文本, 按差值状态着色
pub fn cell_text(text: &str, delta: DeltaState) -> egui::RichText {
    let rich = egui::RichText::new(text).monospace();
    match delta_color(delta) {
        Some(color) => rich.color(color),
        None => rich,
    }
}

/// 筛选器主表格
pub struct ScreenerTable {
    row_height: f32,
}

impl Default for ScreenerTable {
    fn default() -> Self {
        Self { row_height: 22.0 }
    }
}

impl ScreenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 绘制表格, 只画可见列; 返回本帧的用户操作
    pub fn show(&self, ui: &mut egui::Ui, view: &TableView, empty_text: &str) -> Option<TableAction> {
        let headers: Vec<_> = view.visible_headers().collect();
        if headers.is_empty() {
            ui.label(empty_text);
            return None;
        }

        let mut action = None;

        ui.push_id("screener_table", |ui| {
            let table = TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(Column::auto().at_least(70.0), headers.len().saturating_sub(1))
                .column(Column::remainder().at_least(70.0))
                .min_scrolled_height(0.0);

            table
                .header(25.0, |mut header| {
                    for h in &headers {
                        header.col(|ui| {
                            let title = match h.sort {
                                Some(order) => format!("{} {}", h.label, order.arrow()),
                                None => h.label.clone(),
                            };
                            if h.sortable {
                                let response = ui.add(
                                    egui::Label::new(egui::RichText::new(title).strong()).sense(egui::Sense::click()),
                                );
                                if response.clicked() {
                                    action = Some(TableAction::Sort(h.column.to_string()));
                                }
                            } else {
                                ui.strong(title);
                            }
                        });
                    }
                })
                .body(|mut body| {
                    if view.rows.is_empty() {
                        body.row(self.row_height, |mut row| {
                            row.col(|ui| {
                                ui.label(empty_text);
                            });
                        });
                        return;
                    }

                    for row_view in &view.rows {
                        body.row(self.row_height, |mut row| {
                            for cell in row_view.visible_cells() {
                                row.col(|ui| {
                                    if cell.column == "symbol" {
                                        if ui.link(cell_text(&cell.text, cell.delta).strong()).clicked() {
                                            action = Some(TableAction::OpenDetail(row_view.symbol.clone()));
                                        }
                                    } else {
                                        ui.label(cell_text(&cell.text, cell.delta));
                                    }
                                });
                            }
                        });
                    }
                });
        });

        action
    }
}
