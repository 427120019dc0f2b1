use crate::infra::InMemoryRosterRepository;
use chrono::{Local, NaiveDate};
use clap::Args;
use crew_roster::config::AppConfig;
use crew_roster::error::AppError;
use crew_roster::workflows::crew::{
    AssignmentRequest, AssignmentResponse, CrewAssignmentService, EngineOptions,
    PersonnelImporter, RosterSettings, VehicleConfiguration,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AssignArgs {
    /// Personnel directory export (CSV: Username,Vorname,Nachname,Rolle,Qualifikationen)
    #[arg(long)]
    pub(crate) personnel: PathBuf,
    /// Vehicle configurations as a JSON array
    #[arg(long)]
    pub(crate) vehicles: PathBuf,
    /// Roster date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Rotation window in weeks; overrides ROSTER_ROTATION_WINDOW_WEEKS
    #[arg(long)]
    pub(crate) window_weeks: Option<u32>,
    /// Only staff the named vehicles (repeatable)
    #[arg(long = "vehicle")]
    pub(crate) only: Vec<String>,
    /// Print the full result as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_assign(args: AssignArgs) -> Result<(), AppError> {
    let AssignArgs {
        personnel,
        vehicles,
        date,
        window_weeks,
        only,
        json,
    } = args;

    let config = AppConfig::load()?;
    let import = PersonnelImporter::from_path(&personnel)?;
    for error in &import.errors {
        eprintln!("skipped row: {error}");
    }

    let file = std::fs::File::open(&vehicles)?;
    let vehicle_configs: Vec<VehicleConfiguration> = serde_json::from_reader(file)?;

    let repository = InMemoryRosterRepository::with_settings(RosterSettings {
        rotation_window: window_weeks,
        rotation_weights: None,
    });
    let service = CrewAssignmentService::new(
        Arc::new(repository),
        EngineOptions::from(&config.roster),
    );

    let target_date = date.unwrap_or_else(|| Local::now().date_naive());
    let request = AssignmentRequest {
        vehicles: (!only.is_empty()).then_some(only),
        target_date: Some(target_date),
        ..AssignmentRequest::new(import.personnel, vehicle_configs)
    };
    let response = service.assign(request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        render_roster(&response);
    }
    Ok(())
}

fn render_roster(response: &AssignmentResponse) {
    let result = &response.result;
    println!("Crew roster for {}", response.target_date);
    println!(
        "{} of {} vehicles fully staffed",
        result.total_fulfilled, result.total_vehicles
    );

    for vehicle in &result.assignments {
        let status = match (vehicle.fulfilled, vehicle.constraints_met) {
            (true, true) => "ready".to_string(),
            (true, false) => "staffed, rules not met".to_string(),
            (false, _) => format!("understaffed, {} open", vehicle.open_slots().count()),
        };
        println!("\n{} ({}) - {}", vehicle.vehicle, vehicle.vehicle_type, status);
        for slot in &vehicle.slots {
            match &slot.assigned_user {
                Some(person) => {
                    let score = slot
                        .selection
                        .as_ref()
                        .map(|trace| format!(" [score {:.2}]", trace.combined_score))
                        .unwrap_or_default();
                    println!("  - {:<24} {} ({}){}", slot.position, person.name, person.id, score);
                }
                None => println!("  - {:<24} (open)", slot.position),
            }
        }
        for warning in &vehicle.warnings {
            println!("  ! {warning}");
        }
    }

    let run_warnings: Vec<&String> = result
        .warnings
        .iter()
        .filter(|warning| {
            !result
                .assignments
                .iter()
                .any(|vehicle| vehicle.warnings.contains(*warning))
        })
        .collect();
    if !run_warnings.is_empty() {
        println!();
        for warning in run_warnings {
            println!("! {warning}");
        }
    }

    if !result.unassigned_users.is_empty() {
        println!("\nAvailable, not assigned:");
        for person in &result.unassigned_users {
            println!("  - {} ({})", person.name, person.id);
        }
    }
}
