use crate::infra::{load_engine, EngineArgs};
use clap::Args;
use reimbursement_engine::engine::{ReimbursementEngine, Route, TripInput, TripInputError};
use reimbursement_engine::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    /// Trip duration in days
    #[arg(allow_negative_numbers = true)]
    pub(crate) trip_duration_days: f64,
    /// Miles traveled
    #[arg(allow_negative_numbers = true)]
    pub(crate) miles_traveled: f64,
    /// Total receipts amount
    #[arg(allow_negative_numbers = true)]
    pub(crate) total_receipts_amount: f64,
    #[command(flatten)]
    pub(crate) engine: EngineArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the route each trip took through the engine
    #[arg(long)]
    pub(crate) show_route: bool,
    #[command(flatten)]
    pub(crate) engine: EngineArgs,
}

// (days, miles, receipts, scenario)
const DEMO_TRIPS: [(i64, f64, f64, &str); 5] = [
    (4, 69.0, 2321.49, "recorded override"),
    (3, 93.0, 1.42, "short trip with minimal receipts"),
    (1, 1082.0, 250.0, "single day, long distance"),
    (8, 862.0, 1817.85, "long trip"),
    (12, 410.0, 2750.0, "long trip with outlier receipts"),
];

pub(crate) fn run_calculate(args: CalculateArgs) -> Result<(), AppError> {
    let CalculateArgs {
        trip_duration_days,
        miles_traveled,
        total_receipts_amount,
        engine,
    } = args;

    let duration_days = whole_days(trip_duration_days)?;
    let engine = load_engine(engine)?;
    let amount = engine.calculate(duration_days, miles_traveled, total_receipts_amount)?;

    println!("{amount:.2}");
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let engine = load_engine(args.engine)?;
    render_demo(&engine, args.show_route)
}

fn render_demo(engine: &ReimbursementEngine, show_route: bool) -> Result<(), AppError> {
    println!("Travel reimbursement demo");

    for (index, (days, miles, receipts, scenario)) in DEMO_TRIPS.iter().enumerate() {
        let trip = TripInput::new(*days, *miles, *receipts)?;
        let (route, amount) = engine.estimate_with_route(&trip);

        println!("\nCase {}: {}", index + 1, scenario);
        println!(
            "- {} day(s), {} miles, ${:.2} receipts",
            trip.duration_days, trip.miles, trip.receipts
        );
        println!("- reimbursement: ${amount:.2}");
        if show_route {
            println!("- route: {}", describe_route(route));
        }
    }

    Ok(())
}

/// Legacy callers pass days as any numeric string; whole days are kept.
fn whole_days(raw: f64) -> Result<i64, TripInputError> {
    if !raw.is_finite() {
        return Err(TripInputError::InvalidDuration(raw));
    }
    if raw < 0.0 {
        return Err(TripInputError::NegativeDuration(raw.floor() as i64));
    }
    Ok(raw.trunc() as i64)
}

fn describe_route(route: Route) -> String {
    match route {
        Route::Override => "exact override".to_string(),
        Route::Rules(regime) => format!("rule table ({} regime)", regime.label()),
        Route::LongTrip(choice) => format!("long-trip {} model", choice.label()),
        Route::Undefined => "no model for this duration".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reimbursement_engine::engine::{ModelChoice, Regime};

    #[test]
    fn whole_days_truncates_and_rejects_negatives() {
        assert_eq!(whole_days(5.0), Ok(5));
        assert_eq!(whole_days(5.9), Ok(5));
        assert_eq!(
            whole_days(-0.5),
            Err(TripInputError::NegativeDuration(-1))
        );
        assert!(matches!(
            whole_days(f64::NAN),
            Err(TripInputError::InvalidDuration(_))
        ));
    }

    #[test]
    fn routes_render_readable_labels() {
        assert_eq!(
            describe_route(Route::Rules(Regime::Anomaly)),
            "rule table (anomaly regime)"
        );
        assert_eq!(
            describe_route(Route::LongTrip(ModelChoice::Outlier)),
            "long-trip outlier model"
        );
    }
}
