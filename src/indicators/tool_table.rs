//! Tool name to icon and label lookup.
//!
//! Names are matched by substring so prefixed or suffixed tool names still
//! resolve. Icon and label are looked up independently; anything unmatched
//! falls back to the gear icon and a humanized form of the raw name.

use crate::core::glyph::glyph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownTool {
    GetRecentBills,
    GetBillDetails,
    AnalyzeHighCharges,
    CalculateBillItem,
    GetCurrentPlan,
    GetAvailableAddons,
    GetRoamingPlans,
    GetUsageSummary,
    CreateSupportTicket,
    ScheduleCallback,
    GetSelfServiceOptions,
    TransferToBilling,
    TransferToPlan,
    TransferToSupport,
    Handoff,
}

impl KnownTool {
    /// Lookup order.
    pub const ALL: [KnownTool; 15] = [
        Self::GetRecentBills,
        Self::GetBillDetails,
        Self::AnalyzeHighCharges,
        Self::CalculateBillItem,
        Self::GetCurrentPlan,
        Self::GetAvailableAddons,
        Self::GetRoamingPlans,
        Self::GetUsageSummary,
        Self::CreateSupportTicket,
        Self::ScheduleCallback,
        Self::GetSelfServiceOptions,
        Self::TransferToBilling,
        Self::TransferToPlan,
        Self::TransferToSupport,
        Self::Handoff,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::GetRecentBills => "get_recent_bills",
            Self::GetBillDetails => "get_bill_details",
            Self::AnalyzeHighCharges => "analyze_high_charges",
            Self::CalculateBillItem => "calculate_bill_item",
            Self::GetCurrentPlan => "get_current_plan",
            Self::GetAvailableAddons => "get_available_addons",
            Self::GetRoamingPlans => "get_roaming_plans",
            Self::GetUsageSummary => "get_usage_summary",
            Self::CreateSupportTicket => "create_support_ticket",
            Self::ScheduleCallback => "schedule_callback",
            Self::GetSelfServiceOptions => "get_self_service_options",
            Self::TransferToBilling => "transfer_to_BillingAgent",
            Self::TransferToPlan => "transfer_to_PlanAgent",
            Self::TransferToSupport => "transfer_to_SupportAgent",
            Self::Handoff => "Handoff",
        }
    }

    fn icon_shortcode(self) -> Option<&'static str> {
        Some(match self {
            Self::GetRecentBills => "bar_chart",
            Self::GetBillDetails => "clipboard",
            Self::AnalyzeHighCharges => "mag",
            Self::CalculateBillItem => "abacus",
            Self::GetCurrentPlan => "iphone",
            Self::GetAvailableAddons => "heavy_plus_sign",
            Self::GetRoamingPlans => "earth_africa",
            Self::GetUsageSummary => "chart_with_upwards_trend",
            Self::CreateSupportTicket => "ticket",
            Self::ScheduleCallback => "telephone_receiver",
            Self::GetSelfServiceOptions => "hammer_and_wrench",
            Self::Handoff => "arrows_counterclockwise",
            Self::TransferToBilling | Self::TransferToPlan | Self::TransferToSupport => {
                return None
            }
        })
    }

    fn label(self) -> Option<&'static str> {
        Some(match self {
            Self::GetRecentBills => "Getting recent bills",
            Self::GetBillDetails => "Fetching bill details",
            Self::AnalyzeHighCharges => "Analyzing charges",
            Self::CalculateBillItem => "Calculating costs",
            Self::GetCurrentPlan => "Checking current plan",
            Self::GetAvailableAddons => "Finding addons",
            Self::GetRoamingPlans => "Checking roaming plans",
            Self::GetUsageSummary => "Getting usage data",
            Self::CreateSupportTicket => "Creating support ticket",
            Self::ScheduleCallback => "Scheduling callback",
            Self::GetSelfServiceOptions => "Finding self-service options",
            Self::TransferToBilling => "Connecting to billing specialist",
            Self::TransferToPlan => "Connecting to plan advisor",
            Self::TransferToSupport => "Connecting to support agent",
            Self::Handoff => return None,
        })
    }

    fn matching(tool: &str) -> impl Iterator<Item = KnownTool> + '_ {
        Self::ALL
            .into_iter()
            .filter(move |known| tool.contains(known.key()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub icon: &'static str,
    pub label: String,
}

pub fn describe(tool: &str) -> ToolDescriptor {
    let icon = KnownTool::matching(tool)
        .find_map(KnownTool::icon_shortcode)
        .unwrap_or("gear");
    let label = KnownTool::matching(tool)
        .find_map(KnownTool::label)
        .map(str::to_owned)
        .unwrap_or_else(|| humanize(tool));
    ToolDescriptor {
        icon: glyph(icon),
        label,
    }
}

/// `lookupAccount_v2` becomes `lookup account v2`.
pub fn humanize(tool: &str) -> String {
    let mut spaced = String::with_capacity(tool.len() + 4);
    for ch in tool.chars() {
        match ch {
            '_' | '-' => spaced.push(' '),
            upper if upper.is_uppercase() => {
                spaced.push(' ');
                spaced.extend(upper.to_lowercase());
            }
            other => spaced.extend(other.to_lowercase()),
        }
    }
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
