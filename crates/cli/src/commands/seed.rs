use engagefee_db::{connect, migrations, FeeMasterSeed, SeedResult, VerificationResult};

use crate::commands::{
    build_runtime, load_config, CommandResult, EXIT_DB_CONNECTIVITY, EXIT_MIGRATION,
    EXIT_SEED_VERIFICATION,
};

type SeedFailure = (&'static str, String, u8);

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result: Result<SeedResult, SeedFailure> = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;
        let outcome = load_and_verify(&pool).await;
        pool.close().await;
        outcome
    });

    match result {
        Ok(seeded) => {
            let message = format!(
                "fee master data loaded for scopes:\n{}",
                seeded.scopes.iter().map(|scope| format!("  - {scope}")).collect::<Vec<_>>().join("\n")
            );
            CommandResult::success_with_data("seed", message, &seeded)
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

async fn load_and_verify(pool: &engagefee_db::DbPool) -> Result<SeedResult, SeedFailure> {
    migrations::run_pending(pool)
        .await
        .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;
    let seeded = FeeMasterSeed::load(pool)
        .await
        .map_err(|error| ("seed_execution", error.to_string(), EXIT_MIGRATION))?;
    let verification = FeeMasterSeed::verify(pool)
        .await
        .map_err(|error| ("seed_verification", error.to_string(), EXIT_SEED_VERIFICATION))?;

    if verification.all_present {
        Ok(seeded)
    } else {
        Err(("seed_verification", verification_message(&verification), EXIT_SEED_VERIFICATION))
    }
}

fn verification_message(verification: &VerificationResult) -> String {
    let failed = verification.failed_checks().map(|check| check.label.as_str()).collect::<Vec<_>>();
    if failed.is_empty() {
        "some seed data failed to load".to_string()
    } else {
        format!("seed verification failed for checks: {}", failed.join(", "))
    }
}
