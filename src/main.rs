use std::env;
use std::sync::Arc;

use flow_screener::config::{init_config, init_config_with_path, GlobalConfig};
use flow_screener::poller::{HttpScreenerSource, ScreenerSource};
use flow_screener::screener::{FilePreferenceStore, PreferenceStore, ScreenerQuery};
use flow_screener::{init_logging, ScreenerApp};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 参数: [config.toml] [查询字符串]
    let args: Vec<String> = env::args().skip(1).collect();
    let config = match args.iter().find(|a| a.ends_with(".toml")) {
        Some(path) => init_config_with_path(path),
        None => init_config(),
    };
    let query_arg = args.iter().find(|a| !a.ends_with(".toml")).cloned();

    init_logging(&config.system.log_file, &config.system.log_level);
    log::info!("{} v{} 启动", config.system.name, flow_screener::VERSION);

    let store: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::open(&config.gui.preferences_file));
    let source: Arc<dyn ScreenerSource> = Arc::new(HttpScreenerSource::from_config(&config.api)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("screener-poller")
        .enable_all()
        .build()?;

    let mut app = ScreenerApp::new(config.clone(), store, source);
    if let Some(query) = query_arg {
        app.navigate(ScreenerQuery::parse(&query));
    }
    app.start(runtime.handle().clone());

    let result = run(app, &runtime, &config);
    log::info!("{} 退出", config.system.name);
    result
}

#[cfg(feature = "gui")]
fn run(app: ScreenerApp, _runtime: &tokio::runtime::Runtime, config: &GlobalConfig) -> Result<(), Box<dyn std::error::Error>> {
    use eframe::egui;
    use flow_screener::gui::ScreenerGui;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.gui.width, config.gui.height])
            .with_title(config.gui.title.clone()),
        ..Default::default()
    };

    eframe::run_native(
        &config.gui.title,
        options,
        Box::new(move |_cc| Box::new(ScreenerGui::new(app))),
    )?;
    Ok(())
}

/// 无界面模式: 每次应用新数据时把可见列打印到标准输出, Ctrl-C 退出
#[cfg(not(feature = "gui"))]
fn run(mut app: ScreenerApp, runtime: &tokio::runtime::Runtime, _config: &GlobalConfig) -> Result<(), Box<dyn std::error::Error>> {
    use std::time::Duration;

    runtime.block_on(async {
        let mut ticker = tokio::time::interval(Duration::from_millis(200));
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                _ = ticker.tick() => {
                    if app.pump() > 0 {
                        println!("{}\n", app.render_text());
                    }
                }
            }
        }
    });

    app.stop();
    Ok(())
}
