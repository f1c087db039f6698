use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use anyhow::Context;
use clap::Parser;
use log::info;

use tailor::{
    ArtifactDir, ArtifactInfo, ArtifactManager, PersonalizationOrchestrator, PersonalizationState,
    Preset, PropertyStore, UserProfileUpdate,
};

#[derive(Parser)]
#[command(author, version, about = "Personalize design tokens from a UI/UX survey", long_about = None)]
struct Args {
    /// Directory holding model.onnx, feature_columns.json and label_encoders.json
    #[arg(short, long, default_value = "model", conflicts_with = "fetch")]
    artifacts: PathBuf,

    /// Base URL to download the artifact bundle from into the local cache
    #[arg(long)]
    fetch: Option<String>,

    /// Cache name of the downloaded bundle
    #[arg(long, default_value = "engagement")]
    bundle: String,

    /// Force a fresh download of the artifact bundle
    #[arg(long, requires = "fetch")]
    fresh: bool,

    /// Apply a built-in preset (minimal, balanced, rich) instead of running the model
    #[arg(short, long)]
    preset: Option<Preset>,

    /// Partial survey profile as JSON, e.g. '{"age": 65, "accessibility": 5}'
    #[arg(long)]
    profile: Option<String>,

    #[arg(long)]
    age: Option<u32>,

    #[arg(long)]
    accessibility: Option<u8>,

    #[arg(long)]
    animation: Option<u8>,

    /// Print the final state as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn profile_update(&self) -> anyhow::Result<UserProfileUpdate> {
        let mut update = match &self.profile {
            Some(json) => serde_json::from_str(json).context("Invalid --profile JSON")?,
            None => UserProfileUpdate::default(),
        };
        if self.age.is_some() {
            update.age = self.age;
        }
        if self.accessibility.is_some() {
            update.accessibility = self.accessibility;
        }
        if self.animation.is_some() {
            update.animation_transitions = self.animation;
        }
        Ok(update)
    }
}

async fn resolve_loader(args: &Args) -> anyhow::Result<ArtifactDir> {
    let Some(url) = &args.fetch else {
        return Ok(ArtifactDir::new(&args.artifacts));
    };

    let manager = ArtifactManager::new_default()?;
    let info = ArtifactInfo::new(args.bundle.clone(), url.clone());
    if args.fresh {
        info!("Fresh download requested - removing cached bundle...");
        manager.remove_download(&info.name)?;
    }
    Ok(manager.ensure_downloaded(&info).await?)
}

fn print_state(state: &PersonalizationState, theme: &PropertyStore) {
    println!("Model status: {:?}", state.model_status);
    match &state.prediction {
        Some(prediction) => {
            println!("Assigned class: {}", prediction.class_name());
            println!("Confidence: {:.1}%", prediction.confidence_percent());
            if prediction.is_model_derived() {
                println!("Class probabilities:");
                for (label, probability) in prediction.labelled_probabilities() {
                    println!("  {}: {:.1}%", label, probability * 100.0);
                }
            } else {
                println!("(preset, not model-derived)");
            }
        }
        None => println!("Not personalized"),
    }
    println!("\nTheme properties:");
    for (key, value) in theme.snapshot() {
        println!("  {}: {}", key, value);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start_time = Instant::now();

    let theme = Arc::new(PropertyStore::new());
    let orchestrator = PersonalizationOrchestrator::new(theme.clone());

    let update = args.profile_update()?;
    let candidate = orchestrator.snapshot().user_profile.merged(&update);
    candidate.validate()?;

    if let Some(preset) = args.preset {
        orchestrator.apply_preset(preset);
        if !update.is_empty() {
            orchestrator.update_user_profile(&update);
        }
    } else {
        let loader = resolve_loader(&args).await?;
        orchestrator
            .initialize(&loader)
            .await
            .with_context(|| format!("Failed to load model from {:?}", loader.dir()))?;
        info!("Model loaded in {:.2?}", start_time.elapsed());

        orchestrator.update_user_profile(&update);
        orchestrator.run_personalization().await?;
    }

    let state = orchestrator.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print_state(&state, &theme);
    }

    info!("Done in {:.2?}", start_time.elapsed());
    Ok(())
}
