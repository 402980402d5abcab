//! Terminal tables for result rows and run summaries.

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::devices::CurveRow;
use crate::dispatch::{ArbitrageOutcome, LimitOutcome, LoadFollowingOutcome, TransactionKind};
use crate::sim::advisory::Advisory;
use crate::sim::kpi::KpiReport;
use crate::sizing::Sizing;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling()
        .set_header(header);
    table
}

fn kw(value: f64) -> Cell {
    Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)
}

fn soc(value: f64) -> Cell {
    let cell = Cell::new(format!("{:.1}%", value * 100.0)).set_alignment(CellAlignment::Right);
    if value <= 0.0 {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

/// Battery power cell, green while charging and red while discharging.
fn battery_power(value: f64) -> Cell {
    let cell = kw(value);
    if value > 0.0 {
        cell.fg(Color::Green)
    } else if value < 0.0 {
        cell.fg(Color::Red)
    } else {
        cell.add_attribute(Attribute::Dim)
    }
}

pub fn build_curves_table(rows: &[CurveRow]) -> Table {
    let mut table = new_table(vec!["Time", "SOC", "Power, kW", "Energy, kWh"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.datetime.format(TIME_FORMAT)),
            soc(row.soc),
            battery_power(row.power_kw),
            kw(row.energy_kwh),
        ]);
    }
    table
}

pub fn build_transactions_table(outcome: &ArbitrageOutcome) -> Table {
    let mut table = new_table(vec!["Time", "Type", "Price, €/MWh", "Volume, MWh", "Revenue, €"]);
    for t in &outcome.transactions {
        table.add_row(vec![
            Cell::new(t.datetime.format(TIME_FORMAT)),
            Cell::new(t.kind).fg(match t.kind {
                TransactionKind::Buy => Color::Green,
                TransactionKind::Sell => Color::Red,
            }),
            kw(t.price_eur_per_mwh),
            Cell::new(format!("{:.3}", t.volume_mwh)).set_alignment(CellAlignment::Right),
            kw(t.revenue_eur),
        ]);
    }
    table
}

pub fn build_limit_table(outcome: &LimitOutcome) -> Table {
    let mut table = new_table(vec!["Time", "Original, kW", "Battery, kW", "New, kW", "SOC"]);
    for row in &outcome.rows {
        let new = kw(row.new_kw);
        table.add_row(vec![
            Cell::new(row.datetime.format(TIME_FORMAT)),
            kw(row.original_kw),
            battery_power(row.battery_kw),
            if row.new_kw > outcome.limit_kw {
                new.fg(Color::Red)
            } else {
                new
            },
            soc(row.soc),
        ]);
    }
    table
}

pub fn build_load_following_table(outcome: &LoadFollowingOutcome) -> Table {
    let mut table = new_table(vec!["Time", "Load, kW", "Uncovered, kW", "SOC"]);
    for row in &outcome.rows {
        let uncovered = kw(row.uncovered_load_kw);
        table.add_row(vec![
            Cell::new(row.datetime.format(TIME_FORMAT)),
            kw(row.original_load_kw),
            if row.uncovered_load_kw > 0.0 {
                uncovered.fg(Color::DarkYellow)
            } else {
                uncovered
            },
            soc(row.soc),
        ]);
    }
    table
}

pub fn build_kpi_table(kpi: &KpiReport) -> Table {
    let mut table = new_table(vec![
        "Steps",
        "Charged, kWh",
        "Discharged, kWh",
        "Throughput, kWh",
        "EFC",
        "SOC range",
    ]);
    table.add_row(vec![
        Cell::new(kpi.steps),
        kw(kpi.charged_kwh),
        kw(kpi.discharged_kwh),
        kw(kpi.throughput_kwh),
        Cell::new(format!("{:.3}", kpi.equivalent_full_cycles)),
        Cell::new(format!(
            "{:.1}% .. {:.1}%",
            kpi.min_soc * 100.0,
            kpi.max_soc * 100.0
        )),
    ]);
    table
}

pub fn build_sizing_table(sizing: &Sizing) -> Table {
    let mut table = new_table(vec!["Power, kW", "Capacity, kWh", "Duration, h", "EFC", "Limit held"]);
    table.add_row(vec![
        kw(sizing.power_kw),
        kw(sizing.capacity_kwh),
        kw(sizing.rating().duration_hours()),
        Cell::new(format!("{:.3}", sizing.equivalent_full_cycles)),
        if sizing.objective_met {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        },
    ]);
    table
}

pub fn build_advisories_table(advisories: &[Advisory]) -> Table {
    let mut table = new_table(vec!["Advisory"]);
    for advisory in advisories {
        table.add_row(vec![Cell::new(advisory).fg(Color::DarkYellow)]);
    }
    table
}
