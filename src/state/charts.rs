// Chart data
// Pie slices derived from an agent's budget and spend, plus the fixed
// monthly cost series shown on the cost management hub.

use eframe::egui::Color32;

/// Slice colours, in slice order
pub const PIE_COLORS: [Color32; 2] = [
    Color32::from_rgb(0x00, 0xC4, 0x9F),
    Color32::from_rgb(0xED, 0x6A, 0x5E),
];

/// Placeholder total-cost series (month, cost in GBP). No endpoint serves
/// historical cost, so the hub always shows these values.
pub const MONTHLY_COSTS: [(&str, f64); 12] = [
    ("Jan", 10.0),
    ("Feb", 5.0),
    ("Mar", 6.5),
    ("Apr", 2.0),
    ("May", 10.0),
    ("June", 8.0),
    ("July", 11.0),
    ("Aug", 10.1),
    ("Sep", 2.0),
    ("Oct", 5.5),
    ("Nov", 9.14),
    ("Dec", 4.03),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub label: &'static str,
    pub value: f64,
    pub color: Color32,
}

/// Available and Used slices for an agent
///
/// `Available = budget - spend`, `Used = spend`. The values are passed
/// through unchanged even when spend exceeds the budget.
pub fn budget_pie(budget: f64, spend: f64) -> [PieSlice; 2] {
    [
        PieSlice {
            label: "Available",
            value: budget - spend,
            color: PIE_COLORS[0],
        },
        PieSlice {
            label: "Used",
            value: spend,
            color: PIE_COLORS[1],
        },
    ]
}

/// Fraction of the drawable total for each slice; non-positive slices get 0
pub fn slice_fractions(slices: &[PieSlice]) -> Vec<f64> {
    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    slices
        .iter()
        .map(|s| {
            if total > 0.0 {
                s.value.max(0.0) / total
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_pie() {
        let [available, used] = budget_pie(20.0, 4.5);
        assert_eq!(available.label, "Available");
        assert_eq!(available.value, 15.5);
        assert_eq!(used.label, "Used");
        assert_eq!(used.value, 4.5);
    }

    #[test]
    fn test_overspend_is_not_clamped() {
        let slices = budget_pie(10.0, 12.0);
        assert_eq!(slices[0].value, -2.0);
        assert_eq!(slice_fractions(&slices), vec![0.0, 1.0]);
    }

    #[test]
    fn test_fractions() {
        let slices = budget_pie(10.0, 2.5);
        assert_eq!(slice_fractions(&slices), vec![0.75, 0.25]);
        assert_eq!(slice_fractions(&budget_pie(0.0, 0.0)), vec![0.0, 0.0]);
    }

    #[test]
    fn test_monthly_costs_cover_the_year() {
        assert_eq!(MONTHLY_COSTS.len(), 12);
        assert_eq!(MONTHLY_COSTS[0], ("Jan", 10.0));
        assert_eq!(MONTHLY_COSTS[11], ("Dec", 4.03));
    }
}
