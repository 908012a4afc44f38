/// 数值格式化
///
/// 所有字段族共用一张策略表（量级后缀 + 小数位规则），
/// 格式化函数是全函数: 空值、NaN、无穷大都返回该族的零值字符串, 从不panic。

use serde_json::Value;

/// 字段族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldFamily {
    /// 价格
    Price,
    /// 成交量 / 持仓量
    Volume,
    /// 百分比变化（价格变化、持仓变化）
    Percent,
    /// 主动买卖差
    Vdelta,
    /// 波动率
    Volatility,
    /// 成交笔数
    Ticks,
    /// 资金费率
    Funding,
    /// 非数值列
    Text,
}

/// 小数位规则
#[derive(Debug, Clone, Copy, PartialEq)]
enum Digits {
    Fixed(usize),
    /// 接近整数时显示整数, 否则一位小数
    WholeOrTenths,
    /// 截断为整数
    Integer,
}

/// 单个字段族的格式化策略
#[derive(Debug, Clone, Copy)]
pub struct FormatPolicy {
    /// 绝对值达到该阈值后使用 K/M/B 后缀
    suffix_from: Option<f64>,
    suffix_decimals: usize,
    /// (绝对值下限, 小数位), 从大到小匹配
    tiers: &'static [(f64, Digits)],
    fallback: Digits,
    /// 绝对值低于此值按零处理
    zero_below: f64,
    unit: &'static str,
    zero: &'static str,
}

/// 判断"接近整数"的容差
pub const WHOLE_EPSILON: f64 = 1e-6;

const THOUSAND: f64 = 1_000.0;
const MILLION: f64 = 1_000_000.0;
const BILLION: f64 = 1_000_000_000.0;

static PRICE: FormatPolicy = FormatPolicy {
    suffix_from: Some(THOUSAND),
    suffix_decimals: 2,
    tiers: &[(1.0, Digits::Fixed(2)), (0.01, Digits::Fixed(4))],
    fallback: Digits::Fixed(8),
    zero_below: 0.0,
    unit: "",
    zero: "0.00",
};

static VOLUME: FormatPolicy = FormatPolicy {
    suffix_from: Some(THOUSAND),
    suffix_decimals: 2,
    tiers: &[],
    fallback: Digits::Fixed(2),
    zero_below: 0.0,
    unit: "",
    zero: "0.00",
};

static PERCENT: FormatPolicy = FormatPolicy {
    suffix_from: None,
    suffix_decimals: 2,
    tiers: &[(1.0, Digits::Fixed(2)), (0.1, Digits::Fixed(3)), (0.001, Digits::Fixed(4))],
    fallback: Digits::Fixed(6),
    zero_below: 0.0,
    unit: "%",
    zero: "0.00%",
};

static VDELTA: FormatPolicy = FormatPolicy {
    suffix_from: Some(THOUSAND),
    suffix_decimals: 2,
    tiers: &[(1.0, Digits::WholeOrTenths)],
    fallback: Digits::Fixed(2),
    zero_below: 0.0001,
    unit: "",
    zero: "0.00",
};

static VOLATILITY: FormatPolicy = FormatPolicy {
    suffix_from: None,
    suffix_decimals: 2,
    tiers: &[(1.0, Digits::Fixed(2))],
    fallback: Digits::Fixed(3),
    zero_below: 0.0,
    unit: "",
    zero: "0.00",
};

static TICKS: FormatPolicy = FormatPolicy {
    suffix_from: Some(THOUSAND),
    suffix_decimals: 2,
    tiers: &[],
    fallback: Digits::Integer,
    zero_below: 0.0,
    unit: "",
    zero: "0",
};

static FUNDING: FormatPolicy = FormatPolicy {
    suffix_from: None,
    suffix_decimals: 2,
    tiers: &[],
    fallback: Digits::Fixed(6),
    zero_below: 0.0,
    unit: "",
    zero: "0.000000",
};

static TEXT: FormatPolicy = FormatPolicy {
    suffix_from: None,
    suffix_decimals: 2,
    tiers: &[],
    fallback: Digits::Fixed(2),
    zero_below: 0.0,
    unit: "",
    zero: "",
};

impl FieldFamily {
    pub fn policy(&self) -> &'static FormatPolicy {
        match self {
            FieldFamily::Price => &PRICE,
            FieldFamily::Volume => &VOLUME,
            FieldFamily::Percent => &PERCENT,
            FieldFamily::Vdelta => &VDELTA,
            FieldFamily::Volatility => &VOLATILITY,
            FieldFamily::Ticks => &TICKS,
            FieldFamily::Funding => &FUNDING,
            FieldFamily::Text => &TEXT,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, FieldFamily::Text)
    }
}

impl FormatPolicy {
    /// 该族的零值字符串
    pub fn zero(&self) -> &'static str {
        self.zero
    }

    pub fn format(&self, value: Option<f64>) -> String {
        let v = match value {
            Some(v) if v.is_finite() => v,
            _ => return self.zero.to_string(),
        };

        let abs_v = v.abs();
        if v == 0.0 || abs_v < self.zero_below {
            return self.zero.to_string();
        }

        // 档位按舍入后的量级选择, 避免 999.999 显示成 "1000.00"
        let digits = self
            .tiers
            .iter()
            .find(|(floor, digits)| rounded(abs_v, *digits) >= *floor)
            .map(|(_, digits)| *digits)
            .unwrap_or(self.fallback);

        if let Some(threshold) = self.suffix_from {
            if rounded(abs_v, digits) >= threshold {
                let (divisor, letter) = magnitude_suffix(abs_v, self.suffix_decimals);
                return format!("{:.*}{}{}", self.suffix_decimals, v / divisor, letter, self.unit);
            }
        }

        format!("{}{}", format_digits(v, digits), self.unit)
    }
}

/// 按显示精度舍入后的绝对值
fn rounded(abs_v: f64, digits: Digits) -> f64 {
    format_digits(abs_v, digits).parse().unwrap_or(abs_v)
}

/// 选择后缀: 缩放后舍入到 1000 的进位到下一级
fn magnitude_suffix(abs_v: f64, decimals: usize) -> (f64, &'static str) {
    let carries = |divisor: f64| rounded(abs_v / divisor, Digits::Fixed(decimals)) >= THOUSAND;
    if abs_v >= BILLION || carries(MILLION) {
        (BILLION, "B")
    } else if abs_v >= MILLION || carries(THOUSAND) {
        (MILLION, "M")
    } else {
        (THOUSAND, "K")
    }
}

fn format_digits(v: f64, digits: Digits) -> String {
    match digits {
        Digits::Fixed(n) => format!("{:.*}", n, v),
        Digits::WholeOrTenths => {
            let rounded = v.round();
            if (v - rounded).abs() < WHOLE_EPSILON {
                format!("{}", rounded as i64)
            } else {
                format!("{:.1}", v)
            }
        }
        Digits::Integer => format!("{}", v.trunc() as i64),
    }
}

/// 按字段族格式化数值
pub fn format_value(family: FieldFamily, value: Option<f64>) -> String {
    family.policy().format(value)
}

/// 直接格式化 JSON 值, 数字字符串按数字处理, 其他非数值按零处理
pub fn format_json(family: FieldFamily, value: &Value) -> String {
    match family {
        FieldFamily::Text => match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        },
        _ => format_value(family, as_number(value)),
    }
}

/// 宽松地从 JSON 中读取数值
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

pub fn format_price(value: Option<f64>) -> String {
    format_value(FieldFamily::Price, value)
}

pub fn format_volume(value: Option<f64>) -> String {
    format_value(FieldFamily::Volume, value)
}

pub fn format_percent(value: Option<f64>) -> String {
    format_value(FieldFamily::Percent, value)
}

pub fn format_vdelta(value: Option<f64>) -> String {
    format_value(FieldFamily::Vdelta, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_tiers() {
        assert_eq!(format_price(Some(1234.5)), "1.23K");
        assert_eq!(format_price(Some(999.5)), "999.50");
        assert_eq!(format_price(Some(1.5)), "1.50");
        assert_eq!(format_price(Some(0.5)), "0.5000");
        assert_eq!(format_price(Some(0.00012345)), "0.00012345");
        assert_eq!(format_price(Some(2_500_000_000.0)), "2.50B");
    }

    #[test]
    fn test_volume_thresholds() {
        assert_eq!(format_volume(Some(999.0)), "999.00");
        assert_eq!(format_volume(Some(1000.0)), "1.00K");
        assert_eq!(format_volume(Some(1_000_000.0)), "1.00M");
        assert_eq!(format_volume(Some(1_000_000_000.0)), "1.00B");
        assert_eq!(format_volume(Some(2_500_000.0)), "2.50M");
        assert_eq!(format_volume(Some(-1500.0)), "-1.50K");
    }

    #[test]
    fn test_missing_values_are_zero_equivalent() {
        assert_eq!(format_volume(None), "0.00");
        assert_eq!(format_volume(Some(f64::NAN)), "0.00");
        assert_eq!(format_price(None), "0.00");
        assert_eq!(format_percent(Some(f64::INFINITY)), "0.00%");
        assert_eq!(format_vdelta(None), "0.00");
        assert_eq!(format_value(FieldFamily::Ticks, None), "0");
        assert_eq!(format_value(FieldFamily::Funding, None), "0.000000");
    }

    #[test]
    fn test_percent_narrows_decimals() {
        assert_eq!(format_percent(Some(-1.2345)), "-1.23%");
        assert_eq!(format_percent(Some(0.12345)), "0.123%");
        assert_eq!(format_percent(Some(0.0123)), "0.0123%");
        assert_eq!(format_percent(Some(0.0000123)), "0.000012%");
    }

    #[test]
    fn test_vdelta_rounding() {
        assert_eq!(format_vdelta(Some(42.0)), "42");
        assert_eq!(format_vdelta(Some(42.0000001)), "42");
        assert_eq!(format_vdelta(Some(-42.4)), "-42.4");
        assert_eq!(format_vdelta(Some(0.5)), "0.50");
        assert_eq!(format_vdelta(Some(0.00001)), "0.00");
        assert_eq!(format_vdelta(Some(1500.0)), "1.50K");
        assert_eq!(format_vdelta(Some(-2_000_000.0)), "-2.00M");
    }

    #[test]
    fn test_rounding_carries_into_next_tier() {
        assert_eq!(format_price(Some(999.999)), "1.00K");
        assert_eq!(format_price(Some(-999.999)), "-1.00K");
        assert_eq!(format_price(Some(0.999999)), "1.00");
        assert_eq!(format_price(Some(999_999_999.0)), "1.00B");
        assert_eq!(format_volume(Some(999_999.9)), "1.00M");
        assert_eq!(format_volume(Some(999.994)), "999.99");
        assert_eq!(format_vdelta(Some(999.96)), "1.00K");
        assert_eq!(format_value(FieldFamily::Ticks, Some(999_999.0)), "1.00M");
    }

    #[test]
    fn test_ticks_and_volatility() {
        assert_eq!(format_value(FieldFamily::Ticks, Some(512.0)), "512");
        assert_eq!(format_value(FieldFamily::Ticks, Some(12_346.0)), "12.35K");
        assert_eq!(format_value(FieldFamily::Volatility, Some(1.234)), "1.23");
        assert_eq!(format_value(FieldFamily::Volatility, Some(0.1234)), "0.123");
        assert_eq!(format_value(FieldFamily::Funding, Some(0.0001)), "0.000100");
    }

    #[test]
    fn test_json_inputs() {
        assert_eq!(format_json(FieldFamily::Price, &json!("1234.5")), "1.23K");
        assert_eq!(format_json(FieldFamily::Volume, &json!(null)), "0.00");
        assert_eq!(format_json(FieldFamily::Volume, &json!("n/a")), "0.00");
        assert_eq!(format_json(FieldFamily::Volume, &json!({"x": 1})), "0.00");
        assert_eq!(format_json(FieldFamily::Text, &json!("BTCUSDT")), "BTCUSDT");
        assert_eq!(as_number(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(as_number(&json!([1])), None);
    }
}
