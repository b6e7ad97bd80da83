//! Alert composition.
//!
//! One template engine driven by a per-[`InstrumentKind`] field layout table
//! replaces the per-instrument formatter copies the service grew out of:
//! equity alerts carry the last price and share volume, index alerts carry
//! the full OHLC plus monetary turnover, and everything else (labels,
//! 2-decimal formatting, sign-prefixed change) is shared.

use time::format_description::FormatItem;
use time::macros::{format_description, offset};
use time::UtcOffset;

use crate::domain::SHARES_PER_LOT;
use crate::{AlertMessage, IndicatorResult, InstrumentKind, Quote};

/// Exchange-local zone used for the alert timestamp (TWSE, UTC+8).
pub const EXCHANGE_OFFSET: UtcOffset = offset!(+8);

const DISPLAY_TIME: &[FormatItem<'_>] =
    format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");

/// One hundred million, the 億 unit for monetary turnover.
const YI: f64 = 1e8;

/// A single line of an alert, resolved against the quote and indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Header,
    Divider,
    LastPrice,
    VolumeShares,
    Open,
    High,
    Low,
    Close,
    Turnover,
    Change,
    Kdj,
    Time,
}

const EQUITY_LAYOUT: &[Field] = &[
    Field::Header,
    Field::Divider,
    Field::LastPrice,
    Field::VolumeShares,
    Field::Change,
    Field::Kdj,
    Field::Divider,
    Field::Time,
];

const INDEX_LAYOUT: &[Field] = &[
    Field::Header,
    Field::Divider,
    Field::Open,
    Field::High,
    Field::Low,
    Field::Close,
    Field::Turnover,
    Field::Change,
    Field::Kdj,
    Field::Divider,
    Field::Time,
];

const fn layout(kind: InstrumentKind) -> &'static [Field] {
    match kind {
        InstrumentKind::Equity => EQUITY_LAYOUT,
        InstrumentKind::Index => INDEX_LAYOUT,
    }
}

/// Render an alert for one refresh cycle.
///
/// The message starts with a blank line so it sits on its own paragraph in
/// the notification client.
pub fn compose(kind: InstrumentKind, quote: &Quote, indicator: &IndicatorResult) -> AlertMessage {
    let mut lines = vec![String::new()];
    lines.extend(layout(kind).iter().map(|field| render(*field, quote, indicator)));
    AlertMessage::new(lines.join("\n"))
}

fn render(field: Field, quote: &Quote, indicator: &IndicatorResult) -> String {
    match field {
        Field::Header => format!("{} ({})", quote.name, quote.symbol),
        Field::Divider => String::from("---"),
        Field::LastPrice => format!("成交: {:.2}", quote.close),
        Field::VolumeShares => {
            format!("總量: {}", quote.volume.saturating_mul(SHARES_PER_LOT))
        }
        Field::Open => format!("開盤: {:.2}", quote.open),
        Field::High => format!("最高: {:.2}", quote.high),
        Field::Low => format!("最低: {:.2}", quote.low),
        Field::Close => format!("收盤: {:.2}", quote.close),
        Field::Turnover => format!("成交金額: {:.2}億", quote.volume as f64 / YI),
        Field::Change => format!(
            "漲跌: {:+.2} ({:+.2})",
            quote.change, quote.change_percent
        ),
        Field::Kdj => format!(
            "K: {:.2} D: {:.2} J: {:.2}",
            indicator.k, indicator.d, indicator.j
        ),
        Field::Time => format!("時間: {}", display_time(quote)),
    }
}

fn display_time(quote: &Quote) -> String {
    quote
        .last_updated
        .into_inner()
        .to_offset(EXCHANGE_OFFSET)
        .format(DISPLAY_TIME)
        .expect("display format cannot fail for a valid timestamp")
}
