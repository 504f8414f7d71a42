//! Currency labels for listing prices (whole BRL).

/// Short label used on summary cards: `R$2M`, `R$850k`, `R$999`.
///
/// Values are truncated, never rounded up, so a card never overstates a total.
pub fn format_compact(value: u64) -> String {
    if value >= 1_000_000 {
        format!("R${}M", value / 1_000_000)
    } else if value >= 1_000 {
        format!("R${}k", value / 1_000)
    } else {
        format!("R${value}")
    }
}
