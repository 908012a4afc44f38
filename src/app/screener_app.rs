use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::config::GlobalConfig;
use crate::poller::{Poller, PollerHandle, PollUpdate, RequestSequence, ScreenerSource};
use crate::screener::{
    column_spec, render, render_history, render_latest, CellView, ColumnVisibility, Language, MarketType,
    PreferenceStore, ScreenerQuery, ScreenerRow, ScreenerState, SymbolDetail, TableView, UiStrings,
};

/// 打开的详情视图
#[derive(Debug, Clone, Default)]
pub struct DetailView {
    pub symbol: String,
    /// 尚未收到响应时为 None
    pub detail: Option<SymbolDetail>,
    pub latest: Vec<CellView>,
    pub history: TableView,
}

impl DetailView {
    fn new(symbol: String) -> Self {
        Self {
            symbol,
            ..Default::default()
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.detail.is_some()
    }

    /// 历史价格序列, 用于绘图
    pub fn price_series(&self) -> Vec<[f64; 2]> {
        self.detail
            .as_ref()
            .map(|detail| {
                detail
                    .snapshots
                    .iter()
                    .enumerate()
                    .filter_map(|(i, row)| row.value("price").map(|price| [i as f64, price]))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// 轮询统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub applied: u64,
    pub discarded: u64,
}

/// 筛选器控制器
///
/// 持有渲染状态、当前查询参数和偏好存储; 界面线程每帧调用 `pump`
/// 应用轮询结果, 用户操作通过各个方法进入。
pub struct ScreenerApp {
    config: GlobalConfig,
    store: Arc<dyn PreferenceStore>,
    state: ScreenerState,
    view: TableView,
    query: ScreenerQuery,
    language: Language,
    detail: Option<DetailView>,

    poller: Poller,
    updates: mpsc::UnboundedReceiver<PollUpdate>,
    runtime: Option<Handle>,
    list_task: Option<PollerHandle>,
    detail_task: Option<PollerHandle>,

    last_update: Option<DateTime<Local>>,
    stats: PollStats,
}

impl ScreenerApp {
    pub fn new(config: GlobalConfig, store: Arc<dyn PreferenceStore>, source: Arc<dyn ScreenerSource>) -> Self {
        let visibility = ColumnVisibility::load(store.as_ref());
        let language = Language::load(store.as_ref());
        let query = ScreenerQuery::parse(&config.gui.initial_query);
        let (poller, updates) = Poller::new(source, &config.poller);

        let state = ScreenerState::new(visibility);
        let (state, view) = render(state, &[], query.sort.as_ref());

        Self {
            config,
            store,
            state,
            view,
            query,
            language,
            detail: None,
            poller,
            updates,
            runtime: None,
            list_task: None,
            detail_task: None,
            last_update: None,
            stats: PollStats::default(),
        }
    }

    /// 在给定运行时上启动轮询
    pub fn start(&mut self, runtime: Handle) {
        self.runtime = Some(runtime);
        self.restart_list_poller();
        if let Some(symbol) = self.detail.as_ref().map(|d| d.symbol.clone()) {
            self.restart_detail_poller(symbol);
        }
    }

    /// 停止所有定时任务
    pub fn stop(&mut self) {
        if let Some(task) = self.list_task.take() {
            task.stop();
        }
        if let Some(task) = self.detail_task.take() {
            task.stop();
        }
        self.runtime = None;
    }

    pub fn is_running(&self) -> bool {
        self.list_task.is_some()
    }

    fn restart_list_poller(&mut self) {
        if let Some(runtime) = &self.runtime {
            // 先中止旧任务, 新任务第一次 tick 立即请求
            self.list_task = None;
            self.list_task = Some(self.poller.spawn_list(runtime, self.query.clone()));
        }
    }

    fn restart_detail_poller(&mut self, symbol: String) {
        if let Some(runtime) = &self.runtime {
            self.detail_task = None;
            self.detail_task = Some(self.poller.spawn_detail(runtime, symbol));
        }
    }

    /// 应用通道中所有待处理的更新, 返回实际应用的数量
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.updates.try_recv() {
            if self.apply(update) {
                applied += 1;
            }
        }
        applied
    }

    /// 应用一条更新; 序号过期的响应被丢弃
    pub fn apply(&mut self, update: PollUpdate) -> bool {
        let applied = match update {
            PollUpdate::Rows { seq, rows } => {
                if self.poller.list_sequence().accept(seq) {
                    self.apply_rows(&rows);
                    true
                } else {
                    log::debug!("丢弃过期列表响应 #{} (已应用 #{})", seq, self.poller.list_sequence().floor());
                    false
                }
            }
            PollUpdate::Detail { seq, symbol, detail } => {
                let open = self.detail.as_ref().map(|d| d.symbol == symbol).unwrap_or(false);
                if open && self.poller.detail_sequence().accept(seq) {
                    self.apply_detail(detail);
                    true
                } else {
                    log::debug!("丢弃过期详情响应 #{} ({})", seq, symbol);
                    false
                }
            }
        };

        if applied {
            self.stats.applied += 1;
        } else {
            self.stats.discarded += 1;
        }
        applied
    }

    fn apply_rows(&mut self, rows: &[ScreenerRow]) {
        let state = std::mem::take(&mut self.state);
        let (state, view) = render(state, rows, self.query.sort.as_ref());
        self.state = state;
        self.view = view;
        self.last_update = Some(Local::now());
    }

    fn apply_detail(&mut self, detail: SymbolDetail) {
        if let Some(view) = self.detail.as_mut() {
            view.latest = render_latest(&detail);
            view.history = render_history(&detail);
            view.detail = Some(detail);
        }
    }

    /// 用初始数据预填差值缓存
    pub fn seed(&mut self, rows: &[ScreenerRow]) {
        let state = std::mem::take(&mut self.state);
        self.state = state.seed(rows);
    }

    // ---- 列可见性 ----

    /// 切换一列的可见性并立即持久化, 返回切换后的状态
    pub fn toggle_column(&mut self, column: &str) -> bool {
        let visible = self.state.visibility.toggle(column);
        self.visibility_changed();
        visible
    }

    pub fn set_column_visible(&mut self, column: &str, visible: bool) {
        if self.state.visibility.is_visible(column) == visible {
            return;
        }
        self.state.visibility.set_visible(column, visible);
        self.visibility_changed();
    }

    /// 恢复默认列
    pub fn reset_columns(&mut self) {
        self.state.visibility.reset();
        self.visibility_changed();
    }

    fn visibility_changed(&mut self) {
        if let Err(e) = self.state.visibility.save(self.store.as_ref()) {
            log::warn!("保存可见列失败: {}", e);
        }
        self.view.apply_visibility(&self.state.visibility);
    }

    pub fn visibility(&self) -> &ColumnVisibility {
        &self.state.visibility
    }

    // ---- 导航 ----

    /// 点击表头: 生成新的排序参数并重新加载
    pub fn click_header(&mut self, column: &str) {
        self.note_interaction();
        if column_spec(column).map(|spec| spec.sortable()).unwrap_or(false) {
            let next = self.query.sorted_by(column);
            self.navigate(next);
        }
    }

    pub fn set_market_type(&mut self, market_type: MarketType) {
        if self.query.market_type != market_type {
            let next = self.query.with_market_type(market_type);
            self.navigate(next);
        }
    }

    pub fn set_filter(&mut self, key: &str, value: &str) {
        let mut next = self.query.clone();
        next.set_filter(key, value);
        if next != self.query {
            self.navigate(next);
        }
    }

    /// 切换到新的查询参数: 作废在途请求, 清空表格, 立即重新轮询
    pub fn navigate(&mut self, query: ScreenerQuery) {
        log::info!("导航到 {}", query);
        self.query = query;
        self.poller.list_sequence().invalidate();
        self.view.rows.clear();
        self.view.apply_sort(self.query.sort.as_ref());
        self.restart_list_poller();
    }

    pub fn query(&self) -> &ScreenerQuery {
        &self.query
    }

    // ---- 详情 ----

    pub fn open_detail(&mut self, symbol: &str) {
        if self.detail.as_ref().map(|d| d.symbol == symbol).unwrap_or(false) {
            return;
        }
        log::info!("打开详情: {}", symbol);
        self.detail = Some(DetailView::new(symbol.to_string()));
        self.poller.detail_sequence().invalidate();
        self.restart_detail_poller(symbol.to_string());
    }

    pub fn close_detail(&mut self) {
        if self.detail.take().is_some() {
            self.detail_task = None;
            self.poller.detail_sequence().invalidate();
        }
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    // ---- 其他 ----

    /// 记录用户输入, 轮询在静默期内暂停
    pub fn note_interaction(&self) {
        self.poller.gate().mark();
    }

    pub fn set_language(&mut self, language: Language) {
        if self.language == language {
            return;
        }
        self.language = language;
        if let Err(e) = language.save(self.store.as_ref()) {
            log::warn!("保存语言失败: {}", e);
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn strings(&self) -> &'static UiStrings {
        self.language.strings()
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn state(&self) -> &ScreenerState {
        &self.state
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    pub fn stats(&self) -> PollStats {
        self.stats
    }

    pub fn list_sequence(&self) -> &RequestSequence {
        self.poller.list_sequence()
    }

    pub fn detail_sequence(&self) -> &RequestSequence {
        self.poller.detail_sequence()
    }

    /// 可见列的纯文本表格, 每行一条
    pub fn render_text(&self) -> String {
        if self.view.is_empty() {
            return self.strings().empty_table.to_string();
        }

        let header: Vec<&str> = self.view.visible_headers().map(|h| h.column).collect();
        let mut lines = vec![header.join("\t")];
        for row in &self.view.rows {
            let cells: Vec<String> = row
                .visible_cells()
                .map(|cell| format!("{}{}", cell.text, cell.delta.marker()))
                .collect();
            lines.push(cells.join("\t"));
        }
        lines.join("\n")
    }
}

impl Drop for ScreenerApp {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::PollResult;
    use crate::screener::{DeltaState, MemoryPreferenceStore, SortOrder};
    use async_trait::async_trait;

    struct EmptySource;

    #[async_trait]
    impl ScreenerSource for EmptySource {
        async fn fetch_rows(&self, _query: &ScreenerQuery) -> PollResult<Vec<ScreenerRow>> {
            Ok(Vec::new())
        }

        async fn fetch_symbol(&self, symbol: &str) -> PollResult<SymbolDetail> {
            Ok(SymbolDetail {
                symbol: symbol.to_string(),
                ..Default::default()
            })
        }
    }

    fn app_with(store: Arc<MemoryPreferenceStore>) -> ScreenerApp {
        ScreenerApp::new(GlobalConfig::default(), store, Arc::new(EmptySource))
    }

    fn rows(price: f64) -> Vec<ScreenerRow> {
        vec![ScreenerRow::new("BTC").with_value("price", price)]
    }

    #[test]
    fn test_stale_rows_discarded() {
        let mut app = app_with(Arc::new(MemoryPreferenceStore::new()));
        let stale = app.list_sequence().next();
        let fresh = app.list_sequence().next();

        assert!(app.apply(PollUpdate::Rows { seq: fresh, rows: rows(2.0) }));
        assert!(!app.apply(PollUpdate::Rows { seq: stale, rows: rows(1.0) }));

        let price = app.view().row("BTC").unwrap().cell("price").unwrap().text.clone();
        assert_eq!(price, "2.00");
        assert_eq!(app.stats(), PollStats { applied: 1, discarded: 1 });
    }

    #[test]
    fn test_slow_response_applies_while_newer_requests_pending() {
        let mut app = app_with(Arc::new(MemoryPreferenceStore::new()));
        let slow = app.list_sequence().next();
        let pending = app.list_sequence().next();
        let _also_pending = app.list_sequence().next();

        assert!(app.apply(PollUpdate::Rows { seq: slow, rows: rows(1.0) }));
        assert_eq!(app.view().row("BTC").unwrap().cell("price").unwrap().text, "1.00");

        assert!(app.apply(PollUpdate::Rows { seq: pending, rows: rows(2.0) }));
        assert_eq!(app.view().row("BTC").unwrap().cell("price").unwrap().delta, DeltaState::Up);
    }

    #[test]
    fn test_navigation_clears_rows_and_invalidates() {
        let mut app = app_with(Arc::new(MemoryPreferenceStore::new()));
        let seq = app.list_sequence().next();
        app.apply(PollUpdate::Rows { seq, rows: rows(2.0) });
        assert!(!app.view().is_empty());

        app.click_header("price");
        assert!(app.view().is_empty());
        assert_eq!(app.query().sort.as_ref().unwrap().order, SortOrder::Desc);
        assert!(!app.apply(PollUpdate::Rows { seq, rows: rows(3.0) }));

        let seq = app.list_sequence().next();
        assert!(app.apply(PollUpdate::Rows { seq, rows: rows(3.0) }));
        // 导航不清空差值缓存
        assert_eq!(app.view().row("BTC").unwrap().cell("price").unwrap().delta, DeltaState::Up);
    }

    #[test]
    fn test_toggle_persists_and_reapplies() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let mut app = app_with(store.clone());
        let seq = app.list_sequence().next();
        app.apply(PollUpdate::Rows { seq, rows: rows(2.0) });

        assert!(!app.toggle_column("price"));
        assert!(!app.view().row("BTC").unwrap().cell("price").unwrap().visible);

        let reloaded = app_with(store);
        assert!(!reloaded.visibility().is_visible("price"));
    }

    #[test]
    fn test_detail_updates_require_open_symbol() {
        let mut app = app_with(Arc::new(MemoryPreferenceStore::new()));
        let detail = SymbolDetail {
            symbol: "ETH".to_string(),
            snapshots: rows(1.0),
            ..Default::default()
        };

        let seq = app.detail_sequence().next();
        assert!(!app.apply(PollUpdate::Detail { seq, symbol: "ETH".to_string(), detail: detail.clone() }));

        app.open_detail("ETH");
        let seq = app.detail_sequence().next();
        assert!(app.apply(PollUpdate::Detail { seq, symbol: "ETH".to_string(), detail }));
        let view = app.detail().unwrap();
        assert!(view.is_loaded());
        assert_eq!(view.history.rows.len(), 1);
        assert_eq!(view.price_series(), vec![[0.0, 1.0]]);

        app.close_detail();
        assert!(app.detail().is_none());
    }

    #[test]
    fn test_language_persisted() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let mut app = app_with(store.clone());
        app.set_language(Language::Ru);
        assert_eq!(app_with(store).language(), Language::Ru);
    }

    #[test]
    fn test_render_text() {
        let mut app = app_with(Arc::new(MemoryPreferenceStore::new()));
        assert_eq!(app.render_text(), "No data to display.");

        let seq = app.list_sequence().next();
        app.apply(PollUpdate::Rows { seq, rows: rows(2.0) });
        let text = app.render_text();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("symbol\tprice"));
        assert!(lines.next().unwrap().starts_with("BTC\t2.00"));
    }
}
