/// 界面语言

use super::store::{PreferenceStore, StoreResult, LANGUAGE_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    En,
    Ru,
}

/// 界面文本
#[derive(Debug, Clone, Copy)]
pub struct UiStrings {
    pub settings_title: &'static str,
    pub settings_note: &'static str,
    pub settings_button: &'static str,
    pub reset_label: &'static str,
    pub reset_button: &'static str,
    pub empty_table: &'static str,
    pub empty_history: &'static str,
    pub history_title: &'static str,
    pub latest_title: &'static str,
    pub market_label: &'static str,
    pub language_label: &'static str,
    pub updated_label: &'static str,
}

static EN: UiStrings = UiStrings {
    settings_title: "Screener Settings",
    settings_note: "Customize the table display by selecting the columns you want to see.",
    settings_button: "Settings",
    reset_label: "Restore Default Columns",
    reset_button: "Reset",
    empty_table: "No data to display.",
    empty_history: "No data.",
    history_title: "History",
    latest_title: "Latest",
    market_label: "Market",
    language_label: "Language",
    updated_label: "Updated",
};

static RU: UiStrings = UiStrings {
    settings_title: "Настройки скринера",
    settings_note: "Выберите столбцы, которые нужно показывать в таблице.",
    settings_button: "Настройки",
    reset_label: "Восстановить столбцы по умолчанию",
    reset_button: "Сбросить",
    empty_table: "Нет данных для отображения.",
    empty_history: "Нет данных.",
    history_title: "История",
    latest_title: "Последние значения",
    market_label: "Рынок",
    language_label: "Язык",
    updated_label: "Обновлено",
};

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ru];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }

    /// 未知代码回退到英语
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_ascii_lowercase();
        match code.split(['-', '_']).next().unwrap_or_default() {
            "ru" => Language::Ru,
            _ => Language::En,
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ru => "Русский",
        }
    }

    pub fn strings(&self) -> &'static UiStrings {
        match self {
            Language::En => &EN,
            Language::Ru => &RU,
        }
    }

    pub fn load(store: &dyn PreferenceStore) -> Self {
        store
            .get(LANGUAGE_KEY)
            .map(|code| Language::from_code(&code))
            .unwrap_or_default()
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> StoreResult<()> {
        store.set(LANGUAGE_KEY, self.code())
    }
}
