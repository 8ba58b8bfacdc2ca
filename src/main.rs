use anyhow::{anyhow, bail, Context, Result};
use env_logger::Env;
use latent_console::{
    catalog::ModelCatalog,
    client::ApiClient,
    config::ConfigStore,
    entity::EntityTable,
    form::{DefaultFieldResolver, PresetForm},
    model::{model_id, BaseModel, ModelRecord},
    preset::ImageFile,
    presets_api::StylePresetStore,
};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = ConfigStore::new()?;
    let client = ApiClient::new(&config.server_url(), config.request_timeout());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str);

    match command {
        Some("models") => {
            let family = args
                .get(1)
                .ok_or_else(|| anyhow!("usage: latent-console models <family>"))?;
            list_models(&client, family).await
        }
        Some("update-model-description") => {
            let (base, name, description) = match &args[1..] {
                [base, name, description] => (base, name, description),
                _ => bail!(
                    "usage: latent-console update-model-description <base-model> <name> <description>"
                ),
            };
            update_model_description(&client, base, name, description).await
        }
        Some("delete-model") => {
            let (base, name) = match &args[1..] {
                [base, name] => (base, name),
                _ => bail!("usage: latent-console delete-model <base-model> <name>"),
            };
            let base: BaseModel = base.parse().map_err(|err: String| anyhow!(err))?;
            let catalog = ModelCatalog::new(client);
            catalog.delete_main_model(base, name).await?;
            println!("Deleted {}", model_id(base, latent_console::ModelType::Main, name));
            Ok(())
        }
        Some("presets") => {
            let presets = client.list_style_presets().await?;
            if presets.is_empty() {
                println!("No style presets.");
            }
            for preset in presets {
                println!("{}  {}", preset.id, preset.name);
            }
            Ok(())
        }
        Some("preset-create") => {
            let (name, positive) = match &args[1..] {
                [name, positive, ..] => (name.clone(), positive.clone()),
                _ => bail!(
                    "usage: latent-console preset-create <name> <positive-prompt> [negative-prompt] [image-path]"
                ),
            };
            let negative = args.get(3).cloned().unwrap_or_default();
            let image = match args.get(4) {
                Some(path) => Some(load_image(path)?),
                None => None,
            };

            let mut form = PresetForm::new(None, &DefaultFieldResolver);
            form.set_name(name);
            form.set_positive_prompt(positive);
            form.set_negative_prompt(negative);
            form.set_image(image);
            finish_save(form.save(&client).await)
        }
        Some("preset-update") => {
            let (id, name, positive) = match &args[1..] {
                [id, name, positive, ..] => (id.clone(), name.clone(), positive.clone()),
                _ => bail!(
                    "usage: latent-console preset-update <id> <name> <positive-prompt> [negative-prompt]"
                ),
            };
            let negative = args.get(4).cloned();

            let record = client
                .list_style_presets()
                .await?
                .into_iter()
                .find(|preset| preset.id == id)
                .ok_or_else(|| anyhow!("no style preset with id {id:?}"))?;

            let mut form = PresetForm::new(Some(record), &DefaultFieldResolver);
            form.set_name(name);
            form.set_positive_prompt(positive);
            if let Some(negative) = negative {
                form.set_negative_prompt(negative);
            }
            finish_save(form.save(&client).await)
        }
        Some("preset-delete") => {
            let id = args
                .get(1)
                .ok_or_else(|| anyhow!("usage: latent-console preset-delete <id>"))?;
            client.delete_style_preset(id).await?;
            println!("Deleted preset {id}");
            Ok(())
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

async fn list_models(client: &ApiClient, family: &str) -> Result<()> {
    let catalog = ModelCatalog::new(client.clone());
    match family {
        "main" => print_table(&catalog.main_models().await?),
        "lora" => print_table(&catalog.lora_models().await?),
        "controlnet" => print_table(&catalog.controlnet_models().await?),
        "embedding" => print_table(&catalog.textual_inversion_models().await?),
        "vae" => print_table(&catalog.vae_models().await?),
        other => bail!("unknown model family {other:?} (expected main, lora, controlnet, embedding, or vae)"),
    }
    Ok(())
}

async fn update_model_description(
    client: &ApiClient,
    base: &str,
    name: &str,
    description: &str,
) -> Result<()> {
    let base: BaseModel = base.parse().map_err(|err: String| anyhow!(err))?;
    let catalog = ModelCatalog::new(client.clone());

    let table = catalog.main_models().await?;
    let id = model_id(base, latent_console::ModelType::Main, name);
    let entity = table
        .get(&id)
        .ok_or_else(|| anyhow!("no main model with id {id:?}"))?;

    let mut body = entity.config.clone();
    body.description = Some(description.to_string());
    catalog
        .update_main_model(base, name, &body)
        .await
        .context("failed to update main model")?;
    println!("Updated {id}");
    Ok(())
}

fn print_table<T: ModelRecord>(table: &EntityTable<T>) {
    if table.is_empty() {
        println!("No models installed for this family.");
        return;
    }
    for entity in table.iter() {
        println!("{}", entity.id);
    }
}

fn load_image(path: &str) -> Result<ImageFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read image file {path:?}"))?;
    let file_name = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "preset.png".to_string());
    Ok(ImageFile { file_name, bytes })
}

fn finish_save(outcome: latent_console::SaveOutcome) -> Result<()> {
    if let Some(notification) = outcome.notification {
        bail!("{}", notification.title);
    }
    if let Some(record) = outcome.saved {
        println!("Saved preset {}  {}", record.id, record.name);
    }
    Ok(())
}

fn print_usage() {
    println!("latent-console {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Commands:");
    println!("  models <main|lora|controlnet|embedding|vae>");
    println!("  update-model-description <base-model> <name> <description>");
    println!("  delete-model <base-model> <name>");
    println!("  presets");
    println!("  preset-create <name> <positive-prompt> [negative-prompt] [image-path]");
    println!("  preset-update <id> <name> <positive-prompt> [negative-prompt]");
    println!("  preset-delete <id>");
    println!();
    println!("Server URL comes from LATENT_CONSOLE_URL, then settings.json, then the default.");
}
