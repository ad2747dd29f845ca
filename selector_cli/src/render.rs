//! Plain-text rendering of the form and its results.

use selector_core::fields::{FieldName, PreferenceKey};
use selector_core::result::{pretty, HubStiffness, ResultSummary, StiffnessClass, Tone};
use selector_core::session::FormSession;
use selector_core::validation::Diagnostics;

const RULE: &str = "═══════════════════════════════════════";

pub fn print_form(session: &FormSession) {
    let fields = session.fields();
    println!("{}", RULE);
    println!("  CONNECTION INPUTS");
    println!("{}", RULE);
    for field in FieldName::ALL {
        let mut value = fields.display_value(field);
        if value.is_empty() {
            value = "-".to_string();
        }
        let note = match field {
            FieldName::HubLength if session.length_is_auto_derived() => {
                format!("  (auto: {})", session.length_rule_label())
            }
            FieldName::HubLength => "  (manual)".to_string(),
            _ => String::new(),
        };
        println!("  {:<38} {}{}", field.display_name(), value, note);
        for message in session.diagnostics().messages_for(field) {
            println!("      ! {}", message);
        }
    }

    println!();
    println!("  Preferences:");
    for key in PreferenceKey::ALL {
        println!("    {:<36} {:.2}", key.display_name(), fields.user_preferences.get(key));
    }

    if let Some(warning) = session.materials_warning() {
        println!();
        println!("  Note: {}", warning);
    } else if !session.materials().is_empty() {
        println!();
        println!("  Materials: {}", session.materials().join(", "));
    }
    if let Some(banner) = session.banner() {
        println!();
        println!("  [ERROR] {}", banner);
    }
    println!("{}", RULE);
}

pub fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        println!("No problems found.");
        return;
    }
    for d in diagnostics {
        println!("  {:<38} {}", d.field.display_name(), d.message);
    }
}

fn stiffness_text(stiffness: &HubStiffness) -> String {
    let class = match stiffness.class {
        StiffnessClass::Thick => "thick-walled",
        StiffnessClass::Medium => "medium",
        StiffnessClass::Thin => "thin-walled",
    };
    format!("{:.2} ({}) {}", stiffness.factor, class, tone_icon(stiffness.tone))
}

fn tone_icon(tone: Tone) -> &'static str {
    match tone {
        Tone::Ok => "[OK]",
        Tone::Warn => "[WARN]",
        Tone::Fail => "[FAIL]",
    }
}

pub fn print_summary(summary: &ResultSummary) {
    println!("{}", RULE);
    println!("  RECOMMENDED: {}", summary.recommended_label);
    println!("{}", RULE);
    println!("  Design torque:        {} Nmm", pretty(summary.design_torque_nmm));
    println!("  Feasible connections: {}", summary.feasible_count);
    if let Some(mu) = summary.mu_used {
        println!("  Friction μ used:      {:.3}", mu);
    }
    if let Some(stiffness) = &summary.hub_stiffness {
        println!("  Hub stiffness:        {}", stiffness_text(stiffness));
    }
    if let Some(reason) = &summary.infeasible_reason {
        println!();
        println!("  [NOT FEASIBLE] {}", reason);
    }

    if !summary.capacities.is_empty() {
        println!();
        println!("  Capacities:");
        for row in &summary.capacities {
            println!(
                "    {:<8} {:>14} Nmm  {:>+8.1}%  {}{}",
                row.label,
                pretty(row.capacity_nmm),
                row.margin_percent,
                if row.feasible { "[OK]" } else { "[FAIL]" },
                if row.recommended { "  <-" } else { "" }
            );
        }
    }

    if !summary.scores.is_empty() {
        println!();
        println!("  Scores:");
        for row in &summary.scores {
            println!(
                "    {:<8} {:.3}{}",
                row.connection.to_uppercase(),
                row.score,
                if row.recommended { "  <-" } else { "" }
            );
        }
    }

    println!();
    println!("  ML suggestion: {}", summary.ml_label);
    for row in &summary.ml_probabilities {
        println!("    {:<20} {:>5.1}%", row.label, row.probability * 100.0);
    }
    println!("{}", RULE);
}
