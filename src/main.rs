use std::path::Path;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use fitsync::config::AppConfig;
use fitsync::controller::ProfileController;
use fitsync::onboarding::{OnboardingWizard, StepInput, WizardAdvance};
use fitsync::profile::{self, ActivityLevel, Goal, ProfileUpdate};
use fitsync::store::{
    AuthGateway, HttpGateway, HttpRecordStore, LibSqlCache, MemoryGateway, MemoryRecordStore,
    ProfileCache, ProfileStore, RecordStore,
};

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();

    eprintln!("Fitsync v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Cache: {}", config.cache_path);

    let cache: Arc<dyn ProfileCache> =
        Arc::new(LibSqlCache::new_local(Path::new(&config.cache_path)).await?);

    let (gateway, remote): (Arc<dyn AuthGateway>, Arc<dyn RecordStore>) =
        match &config.api_base_url {
            Some(url) => {
                eprintln!("   Remote: {url}");
                (
                    Arc::new(HttpGateway::new(url.clone())),
                    Arc::new(HttpRecordStore::new(url.clone())),
                )
            }
            None => {
                eprintln!("   Remote: none (in-memory demo mode)");
                (
                    Arc::new(MemoryGateway::new()),
                    Arc::new(MemoryRecordStore::new()),
                )
            }
        };

    let store = Arc::new(ProfileStore::new(gateway, remote, Arc::clone(&cache)));
    let controller = ProfileController::new(store, cache);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    authenticate(&controller, &mut lines).await?;

    controller.load_profile().await?;
    let needs_onboarding = controller
        .state()
        .profile
        .map(|p| !p.onboarding_completed)
        .unwrap_or(true);

    if needs_onboarding {
        eprintln!("\nLet's set up your profile. Type 'back' to revisit a step.");
        run_wizard(&controller, &mut lines).await?;
    }

    print_summary(&controller);
    command_loop(&controller, &mut lines).await?;

    Ok(())
}

async fn prompt(lines: &mut InputLines, label: &str) -> anyhow::Result<String> {
    eprint!("{label} ");
    let line = lines
        .next_line()
        .await?
        .ok_or_else(|| anyhow::anyhow!("stdin closed"))?;
    Ok(line.trim().to_string())
}

async fn authenticate(
    controller: &ProfileController,
    lines: &mut InputLines,
) -> anyhow::Result<()> {
    loop {
        let action = prompt(lines, "signin, register, or reset?").await?;
        let email = prompt(lines, "email:").await?;
        if let Err(e) = profile::validate_email(&email) {
            eprintln!("   {e}");
            continue;
        }

        match action.as_str() {
            "reset" => {
                controller.request_password_reset(email).await?;
                match controller.take_password_reset_result() {
                    Some(Ok(())) => eprintln!("   Reset email sent."),
                    Some(Err(e)) => eprintln!("   {e}"),
                    None => {}
                }
                continue;
            }
            "signin" | "register" => {}
            other => {
                eprintln!("   Unknown action: {other}");
                continue;
            }
        }

        let password = prompt(lines, "password:").await?;
        if let Err(e) = profile::validate_password(&password) {
            eprintln!("   {e}");
            continue;
        }
        let password = SecretString::from(password);

        let result = if action == "register" {
            controller.register(email, password).await?;
            controller.take_register_result()
        } else {
            controller.sign_in(email, password).await?;
            controller.take_sign_in_result()
        };

        match result {
            Some(Ok(())) => return Ok(()),
            Some(Err(e)) => eprintln!("   {e}"),
            None => {}
        }
    }
}

fn parse_step_input(step: fitsync::onboarding::OnboardingStep, raw: &str) -> Result<StepInput, String> {
    use fitsync::onboarding::OnboardingStep as Step;
    match step {
        Step::Age => raw
            .parse()
            .map(StepInput::Age)
            .map_err(|_| format!("Not a whole number: {raw}")),
        Step::Height => raw
            .parse()
            .map(StepInput::Height)
            .map_err(|_| format!("Not a whole number: {raw}")),
        Step::Weight => raw
            .parse()
            .map(StepInput::Weight)
            .map_err(|_| format!("Not a number: {raw}")),
        Step::Goal => match raw {
            "lose_weight" => Ok(StepInput::Goal(Goal::LoseWeight)),
            "maintain" => Ok(StepInput::Goal(Goal::Maintain)),
            "gain_muscle" => Ok(StepInput::Goal(Goal::GainMuscle)),
            _ => Err(format!(
                "Pick one of lose_weight, maintain, gain_muscle (got {raw})"
            )),
        },
        Step::ActivityLevel => match raw {
            "sedentary" => Ok(StepInput::ActivityLevel(ActivityLevel::Sedentary)),
            "lightly_active" => Ok(StepInput::ActivityLevel(ActivityLevel::LightlyActive)),
            "moderately_active" => Ok(StepInput::ActivityLevel(ActivityLevel::ModeratelyActive)),
            "very_active" => Ok(StepInput::ActivityLevel(ActivityLevel::VeryActive)),
            _ => Err(format!(
                "Pick one of sedentary, lightly_active, moderately_active, very_active (got {raw})"
            )),
        },
    }
}

async fn run_wizard(controller: &ProfileController, lines: &mut InputLines) -> anyhow::Result<()> {
    let mut wizard = OnboardingWizard::new(controller.clone());
    loop {
        let step = wizard.step();
        let label = match wizard.prefill() {
            Some(_) => format!("{step} (staged)>"),
            None => format!("{step}>"),
        };
        let raw = prompt(lines, &label).await?;
        if raw == "back" {
            wizard.previous();
            continue;
        }
        let input = match parse_step_input(step, &raw) {
            Ok(input) => input,
            Err(msg) => {
                eprintln!("   {msg}");
                continue;
            }
        };
        if let Err(e) = wizard.stage(input) {
            eprintln!("   {e}");
            continue;
        }
        match wizard.next() {
            Ok(WizardAdvance::Step(_)) => {}
            Ok(WizardAdvance::Committed(handle)) => {
                handle.await?;
                break;
            }
            Err(e) => eprintln!("   {e}"),
        }
    }

    match controller.take_onboarding_result() {
        Some(Ok(())) => eprintln!("   Profile saved."),
        Some(Err(e)) => eprintln!("   Commit failed: {e}"),
        None => {}
    }
    Ok(())
}

fn print_summary(controller: &ProfileController) {
    let state = controller.state();
    let Some(profile) = state.profile else {
        eprintln!("\nNo profile available.");
        return;
    };
    eprintln!(
        "\n{} — {} y, {} cm, {} kg, goal {}, {}",
        profile.email, profile.age, profile.height, profile.weight, profile.goal,
        profile.activity_level,
    );
    match state.metrics {
        Some(m) => eprintln!(
            "   BMR {} kcal · TDEE {} kcal · daily goal {} kcal · BMI {:.1} ({})",
            m.bmr, m.tdee, m.daily_calorie_goal, m.bmi, m.bmi_class
        ),
        None => eprintln!("   Metrics unavailable (incomplete profile)."),
    }
}

async fn command_loop(
    controller: &ProfileController,
    lines: &mut InputLines,
) -> anyhow::Result<()> {
    eprintln!("\nCommands: weight <kg>, metrics, signout, quit");
    loop {
        let raw = prompt(lines, ">").await?;
        match raw.split_once(' ') {
            Some(("weight", value)) => {
                let Ok(weight) = value.trim().parse::<f64>() else {
                    eprintln!("   Not a number: {value}");
                    continue;
                };
                if let Err(e) = profile::validate_weight(weight) {
                    eprintln!("   {e}");
                    continue;
                }
                let Some(current) = controller.state().profile else {
                    eprintln!("   No profile loaded.");
                    continue;
                };
                let mut update = ProfileUpdate::from_profile(&current);
                update.weight = weight;
                controller.update_profile(update).await?;
                match controller.take_update_result() {
                    Some(Ok(())) => print_summary(controller),
                    Some(Err(e)) => eprintln!("   {e}"),
                    None => {}
                }
            }
            None if raw == "metrics" => print_summary(controller),
            None if raw == "signout" => {
                controller.sign_out().await?;
                eprintln!("   Signed out.");
                return Ok(());
            }
            None if raw == "quit" => return Ok(()),
            _ => eprintln!("   Unknown command: {raw}"),
        }
    }
}
