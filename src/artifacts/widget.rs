//! Widget artifacts.
//!
//! A widget payload is decoded into a [`WidgetView`] through the closed
//! [`WidgetKind`] dispatch. Decoding is lenient: a missing field reads as an
//! empty string, zero, or empty list, and an unrecognized type decodes to the
//! generic body, so building a view never fails.

use chat_protocol::{WidgetAction, WidgetRef};
use serde_json::Value;

use crate::core::glyph::glyph;
use crate::core::html::{escape_attr, escape_text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetKind {
    CurrentPlan,
    RoamingPlans,
    Addons,
    UsageSummary,
    SupportTicket,
    Unrecognized(String),
}

impl WidgetKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "current_plan" => Self::CurrentPlan,
            "roaming_plans" => Self::RoamingPlans,
            "addons" => Self::Addons,
            "usage_summary" => Self::UsageSummary,
            "support_ticket" => Self::SupportTicket,
            other => Self::Unrecognized(other.to_owned()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::CurrentPlan => "current_plan",
            Self::RoamingPlans => "roaming_plans",
            Self::Addons => "addons",
            Self::UsageSummary => "usage_summary",
            Self::SupportTicket => "support_ticket",
            Self::Unrecognized(tag) => tag,
        }
    }

    pub fn icon(&self) -> &'static str {
        glyph(match self {
            Self::CurrentPlan => "iphone",
            Self::RoamingPlans => "earth_africa",
            Self::Addons | Self::Unrecognized(_) => "wrench",
            Self::UsageSummary => "chart_with_upwards_trend",
            Self::SupportTicket => "ticket",
        })
    }

    fn css_class(&self) -> &'static str {
        match self {
            Self::CurrentPlan => "current-plan-widget",
            Self::RoamingPlans => "roaming-plans-widget",
            Self::Addons => "addons-widget",
            Self::UsageSummary => "usage-summary-widget",
            Self::SupportTicket => "support-ticket-widget",
            Self::Unrecognized(_) => "generic-widget",
        }
    }
}

/// Link rendered under a widget. `visual_kind` selects the button style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLink {
    pub label: String,
    pub url: String,
    pub visual_kind: String,
}

impl From<&WidgetAction> for ActionLink {
    fn from(action: &WidgetAction) -> Self {
        Self {
            label: action.label.clone(),
            url: action.url.clone(),
            visual_kind: action.kind.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetArtifact {
    pub kind: WidgetKind,
    pub title: String,
    pub data: Value,
    pub actions: Vec<ActionLink>,
    /// Token literal this artifact replaces.
    pub pattern: String,
}

impl WidgetArtifact {
    /// Builds the artifact from an authoritative side-channel entry.
    ///
    /// The payload's own `widget_type` decides the shape; the entry's outer
    /// `widget_type` is used only when the payload omits it.
    pub fn from_ref(widget: &WidgetRef) -> Self {
        let payload = &widget.widget_data;
        let tag = if payload.widget_type.is_empty() {
            &widget.widget_type
        } else {
            &payload.widget_type
        };
        Self {
            kind: WidgetKind::from_tag(tag),
            title: payload.title.clone(),
            data: payload.data.clone(),
            actions: payload.actions.iter().map(ActionLink::from).collect(),
            pattern: widget.pattern.clone(),
        }
    }

    /// Synthesizes an empty artifact from a bare inline token.
    pub fn from_token(widget_type: &str, pattern: &str) -> Self {
        Self {
            kind: WidgetKind::from_tag(widget_type),
            title: format!("{widget_type} Widget"),
            data: Value::Array(Vec::new()),
            actions: Vec::new(),
            pattern: pattern.to_owned(),
        }
    }

    pub fn view(&self) -> WidgetView {
        let data = &self.data;
        let body = match &self.kind {
            WidgetKind::CurrentPlan => WidgetBody::CurrentPlan(PlanSummary::decode(data)),
            WidgetKind::RoamingPlans => {
                WidgetBody::RoamingPlans(records(data).map(RoamingPlan::decode).collect())
            }
            WidgetKind::Addons => WidgetBody::Addons(records(data).map(Addon::decode).collect()),
            WidgetKind::UsageSummary => WidgetBody::UsageSummary(UsageSummary::decode(data)),
            WidgetKind::SupportTicket => WidgetBody::SupportTicket(SupportTicket::decode(data)),
            WidgetKind::Unrecognized(tag) => WidgetBody::Generic {
                type_tag: tag.clone(),
            },
        };
        let title = match (&body, self.title.is_empty()) {
            (WidgetBody::Generic { .. }, true) => "Widget".to_owned(),
            _ => self.title.clone(),
        };
        WidgetView {
            icon: self.kind.icon(),
            kind: self.kind.clone(),
            title,
            body,
            actions: self.actions.clone(),
        }
    }

    pub fn to_html(&self) -> String {
        self.view().to_html()
    }
}

/// Display-ready description of one widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetView {
    pub kind: WidgetKind,
    pub icon: &'static str,
    pub title: String,
    pub body: WidgetBody,
    pub actions: Vec<ActionLink>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetBody {
    CurrentPlan(PlanSummary),
    RoamingPlans(Vec<RoamingPlan>),
    Addons(Vec<Addon>),
    UsageSummary(UsageSummary),
    SupportTicket(SupportTicket),
    Generic { type_tag: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanSummary {
    pub plan_name: String,
    pub monthly_cost: f64,
    pub data_allowance: String,
    pub minutes: String,
    pub texts: String,
    pub included_features: Vec<String>,
    pub contract_end_date: String,
}

impl PlanSummary {
    fn decode(value: &Value) -> Self {
        Self {
            plan_name: text(value, "plan_name"),
            monthly_cost: amount(value, "monthly_cost"),
            data_allowance: text(value, "data_allowance"),
            minutes: text(value, "minutes"),
            texts: text(value, "texts"),
            included_features: text_list(value, "included_features"),
            contract_end_date: text(value, "contract_end_date"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoamingPlan {
    pub name: String,
    pub price: f64,
    pub duration: String,
    pub data: String,
    pub minutes: String,
    pub texts: String,
    pub countries: Vec<String>,
    pub savings_example: String,
}

impl RoamingPlan {
    fn decode(value: &Value) -> Self {
        Self {
            name: text(value, "name"),
            price: amount(value, "price"),
            duration: text(value, "duration"),
            data: text(value, "data"),
            minutes: text(value, "minutes"),
            texts: text(value, "texts"),
            countries: text_list(value, "countries"),
            savings_example: text(value, "savings_example"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Addon {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub duration: String,
    pub activation: String,
}

impl Addon {
    fn decode(value: &Value) -> Self {
        Self {
            name: text(value, "name"),
            price: amount(value, "price"),
            description: text(value, "description"),
            duration: text(value, "duration"),
            activation: text(value, "activation"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSummary {
    pub data_used: String,
    pub data_total: String,
    pub data_percentage: f64,
    pub minutes_used: String,
    pub texts_used: String,
    pub days_remaining: String,
    pub alerts: Vec<String>,
}

impl UsageSummary {
    fn decode(value: &Value) -> Self {
        let data = value.get("data").unwrap_or(&Value::Null);
        let used = |section: &str| {
            value
                .get(section)
                .map(|section| text(section, "used"))
                .unwrap_or_default()
        };
        Self {
            data_used: text(data, "used"),
            data_total: text(data, "total"),
            data_percentage: amount(data, "percentage"),
            minutes_used: used("minutes"),
            texts_used: used("texts"),
            days_remaining: text(value, "days_remaining"),
            alerts: text_list(value, "alerts"),
        }
    }

    /// Meter fill width, clamped to `0..=100`.
    pub fn meter_width(&self) -> f64 {
        self.data_percentage.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupportTicket {
    pub ticket_id: String,
    pub status: String,
    pub priority: String,
    pub created_date: String,
    pub subject: String,
    pub contact_method: String,
    pub estimated_callback: String,
    pub assigned_team: String,
    pub description: String,
    pub reference_number: String,
}

impl SupportTicket {
    fn decode(value: &Value) -> Self {
        Self {
            ticket_id: text(value, "ticket_id"),
            status: text(value, "status"),
            priority: text(value, "priority"),
            created_date: text(value, "created_date"),
            subject: text(value, "subject"),
            contact_method: text(value, "contact_method"),
            estimated_callback: text(value, "estimated_callback"),
            assigned_team: text(value, "assigned_team"),
            description: text(value, "description"),
            reference_number: text(value, "reference_number"),
        }
    }

    pub fn status_class(&self) -> &'static str {
        match self.status.as_str() {
            "Open" => "status-open",
            "In Progress" => "status-progress",
            _ => "status-closed",
        }
    }
}

impl WidgetView {
    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<div class=\"widget-preview {}\"><div class=\"widget-header\"><span class=\"widget-icon\">{}</span><span class=\"widget-title\">{}</span></div><div class=\"widget-content\">",
            self.kind.css_class(),
            self.icon,
            escape_text(&self.title)
        );
        match &self.body {
            WidgetBody::CurrentPlan(plan) => push_plan(&mut html, plan),
            WidgetBody::RoamingPlans(plans) => {
                html.push_str("<div class=\"roaming-plans-grid\">");
                plans.iter().for_each(|plan| push_roaming_plan(&mut html, plan));
                html.push_str("</div>");
            }
            WidgetBody::Addons(addons) => {
                html.push_str("<div class=\"addons-list\">");
                addons.iter().for_each(|addon| push_addon(&mut html, addon));
                html.push_str("</div>");
            }
            WidgetBody::UsageSummary(usage) => push_usage(&mut html, usage),
            WidgetBody::SupportTicket(ticket) => push_ticket(&mut html, ticket),
            WidgetBody::Generic { type_tag } => {
                html.push_str(&format!(
                    "<p>Widget type: {}</p><small>This widget type is not yet implemented.</small>",
                    escape_text(type_tag)
                ));
            }
        }
        if !matches!(self.body, WidgetBody::Generic { .. }) {
            push_actions(&mut html, &self.actions);
        }
        html.push_str("</div></div>");
        html
    }
}

fn push_plan(html: &mut String, plan: &PlanSummary) {
    let features: String = plan
        .included_features
        .iter()
        .map(|feature| format!("<li>{} {}</li>", glyph("white_check_mark"), escape_text(feature)))
        .collect();
    html.push_str(&format!(
        "<div class=\"plan-info\"><h3>{}</h3><div class=\"plan-cost\">{}/month</div><div class=\"plan-allowances\">{}{}{}</div><div class=\"plan-features\"><h4>Included Features:</h4><ul>{features}</ul></div><div class=\"contract-info\"><small>Contract ends: {}</small></div></div>",
        escape_text(&plan.plan_name),
        pounds(plan.monthly_cost),
        labelled("allowance", "bar_chart", &plan.data_allowance),
        labelled("allowance", "telephone_receiver", &plan.minutes),
        labelled("allowance", "speech_balloon", &plan.texts),
        escape_text(&plan.contract_end_date),
    ));
}

fn push_roaming_plan(html: &mut String, plan: &RoamingPlan) {
    html.push_str(&format!(
        "<div class=\"roaming-plan-card\"><div class=\"plan-header\"><h4>{}</h4><div class=\"plan-price\">{}</div></div><div class=\"plan-details\">{}{}{}{}</div><div class=\"plan-countries\"><small>{} {}</small></div><div class=\"savings-info\"><small>{} {}</small></div></div>",
        escape_text(&plan.name),
        pounds(plan.price),
        labelled("detail", "alarm_clock", &plan.duration),
        labelled("detail", "bar_chart", &plan.data),
        labelled("detail", "telephone_receiver", &plan.minutes),
        labelled("detail", "speech_balloon", &plan.texts),
        glyph("round_pushpin"),
        escape_text(&plan.countries.join(", ")),
        glyph("moneybag"),
        escape_text(&plan.savings_example),
    ));
}

fn push_addon(html: &mut String, addon: &Addon) {
    html.push_str(&format!(
        "<div class=\"addon-card\"><div class=\"addon-header\"><h4>{}</h4><div class=\"addon-price\">{}</div></div><div class=\"addon-description\">{}</div><div class=\"addon-details\"><small>{} {}</small><small>{} {}</small></div></div>",
        escape_text(&addon.name),
        pounds(addon.price),
        escape_text(&addon.description),
        glyph("alarm_clock"),
        escape_text(&addon.duration),
        glyph("zap"),
        escape_text(&addon.activation),
    ));
}

fn push_usage(html: &mut String, usage: &UsageSummary) {
    let percent = number(usage.data_percentage);
    let alerts: String = usage
        .alerts
        .iter()
        .map(|alert| {
            format!(
                "<div class=\"usage-alert\">{} {}</div>",
                glyph("warning"),
                escape_text(alert)
            )
        })
        .collect();
    html.push_str(&format!(
        "<div class=\"usage-meters\"><div class=\"usage-meter\"><div class=\"meter-label\">{} Data Usage</div><div class=\"meter-bar\"><div class=\"meter-fill\" style=\"width: {}%\"></div></div><div class=\"meter-text\">{} of {} ({percent}%)</div></div><div class=\"usage-stats\"><div class=\"stat\">{} {} minutes</div><div class=\"stat\">{} {} texts</div><div class=\"stat\">{} {} days remaining</div></div></div><div class=\"usage-alerts\">{alerts}</div>",
        glyph("bar_chart"),
        number(usage.meter_width()),
        escape_text(&usage.data_used),
        escape_text(&usage.data_total),
        glyph("telephone_receiver"),
        escape_text(&usage.minutes_used),
        glyph("speech_balloon"),
        escape_text(&usage.texts_used),
        glyph("date"),
        escape_text(&usage.days_remaining),
    ));
}

fn push_ticket(html: &mut String, ticket: &SupportTicket) {
    let rows = [
        ("date", "Created:", &ticket.created_date),
        ("clipboard", "Subject:", &ticket.subject),
        ("telephone_receiver", "Contact Method:", &ticket.contact_method),
        ("stopwatch", "Estimated Response:", &ticket.estimated_callback),
        ("busts_in_silhouette", "Assigned Team:", &ticket.assigned_team),
    ];
    let rows: String = rows
        .iter()
        .map(|(icon, label, value)| {
            format!(
                "<div class=\"ticket-row\"><span class=\"ticket-label\">{} {label}</span><span class=\"ticket-value\">{}</span></div>",
                glyph(icon),
                escape_text(value)
            )
        })
        .collect();
    html.push_str(&format!(
        "<div class=\"ticket-summary\"><div class=\"ticket-header\"><div class=\"ticket-id\"><strong>Ticket #{}</strong><span class=\"ticket-status {}\">{}</span></div><div class=\"ticket-priority\">Priority: {}</div></div><div class=\"ticket-details\">{rows}</div><div class=\"ticket-description\"><strong>Description:</strong><p>{}</p></div><div class=\"ticket-reference\"><small><strong>Reference:</strong> {}</small></div></div>",
        escape_text(&ticket.ticket_id),
        ticket.status_class(),
        escape_text(&ticket.status),
        escape_text(&ticket.priority),
        escape_text(&ticket.description),
        escape_text(&ticket.reference_number),
    ));
}

fn push_actions(html: &mut String, actions: &[ActionLink]) {
    html.push_str("<div class=\"widget-actions\">");
    for action in actions {
        html.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"widget-action {}\">{}</a>",
            escape_attr(&action.url),
            escape_attr(&action.visual_kind),
            escape_text(&action.label)
        ));
    }
    html.push_str("</div>");
}

fn labelled(class: &str, icon: &str, value: &str) -> String {
    format!(
        "<div class=\"{class}\">{} {}</div>",
        glyph(icon),
        escape_text(value)
    )
}

fn pounds(value: f64) -> String {
    format!("£{value:.2}")
}

/// Formats without a trailing `.0` for whole numbers.
fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn records(value: &Value) -> impl Iterator<Item = &Value> {
    value.as_array().into_iter().flatten()
}

fn text(value: &Value, key: &str) -> String {
    value.get(key).map(scalar_text).unwrap_or_default()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    }
}

fn amount(value: &Value, key: &str) -> f64 {
    match value.get(key) {
        Some(Value::Number(number)) => number.as_f64().unwrap_or_default(),
        Some(Value::String(text)) => text.trim().parse().unwrap_or_default(),
        _ => 0.0,
    }
}

fn text_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(scalar_text).collect())
        .unwrap_or_default()
}
