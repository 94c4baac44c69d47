use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

/// Endpoint do dataset histórico da Mega-Sena no Kaggle.
pub const DEFAULT_DATASET_URL: &str =
    "https://www.kaggle.com/api/v1/datasets/download/danttis/brazil-lottery-mega-sena?fileName=MegaSena.csv";

pub const DEFAULT_TTL_HOURS: i64 = 24;

const MANIFEST_FILE: &str = "manifest.json";
const DATASET_FILE: &str = "megasena.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub path: PathBuf,
    pub cached: bool,
    pub fetched_at: DateTime<Utc>,
}

pub fn cache_dir() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("cache");
    path
}

/// Um cache é reutilizável enquanto apontar para a mesma URL e for mais novo
/// que o TTL. Mudar a URL invalida a entrada mesmo dentro do prazo.
pub fn is_fresh(manifest: &CacheManifest, url: &str, ttl_hours: i64, now: DateTime<Utc>) -> bool {
    manifest.url == url && now - manifest.fetched_at < Duration::hours(ttl_hours)
}

fn load_manifest(dir: &Path) -> Option<CacheManifest> {
    let json = std::fs::read_to_string(dir.join(MANIFEST_FILE)).ok()?;
    serde_json::from_str(&json).ok()
}

fn save_manifest(dir: &Path, manifest: &CacheManifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(dir.join(MANIFEST_FILE), json)
        .context("Não foi possível gravar o manifesto do cache")?;
    Ok(())
}

/// Baixa o CSV de resultados (ou reutiliza a cópia em cache dentro do TTL).
/// Credenciais opcionais do Kaggle vêm de KAGGLE_USERNAME / KAGGLE_KEY.
pub fn fetch_dataset(url: &str, dir: &Path, ttl_hours: i64, refresh: bool) -> Result<FetchOutcome> {
    let dataset_path = dir.join(DATASET_FILE);

    if !refresh {
        if let Some(manifest) = load_manifest(dir) {
            if is_fresh(&manifest, url, ttl_hours, Utc::now()) && dataset_path.exists() {
                return Ok(FetchOutcome {
                    path: dataset_path,
                    cached: true,
                    fetched_at: manifest.fetched_at,
                });
            }
        }
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Não foi possível criar o diretório {:?}", dir))?;

    let bytes = download(url)?;
    if bytes.is_empty() {
        bail!("Resposta vazia ao baixar {}", url);
    }
    std::fs::write(&dataset_path, &bytes)
        .with_context(|| format!("Não foi possível gravar {:?}", dataset_path))?;

    let manifest = CacheManifest {
        url: url.to_string(),
        fetched_at: Utc::now(),
    };
    save_manifest(dir, &manifest)?;

    Ok(FetchOutcome {
        path: dataset_path,
        cached: false,
        fetched_at: manifest.fetched_at,
    })
}

fn download(url: &str) -> Result<Vec<u8>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message("Baixando resultados históricos...");
    spinner.enable_steady_tick(StdDuration::from_millis(100));

    let client = reqwest::blocking::Client::builder()
        .timeout(StdDuration::from_secs(60))
        .build()
        .context("Não foi possível criar o cliente HTTP")?;

    let mut request = client.get(url);
    if let (Ok(user), Ok(key)) = (
        std::env::var("KAGGLE_USERNAME"),
        std::env::var("KAGGLE_KEY"),
    ) {
        request = request.basic_auth(user, Some(key));
    }

    let response = request
        .send()
        .with_context(|| format!("Falha na requisição para {}", url))?;
    if !response.status().is_success() {
        spinner.finish_and_clear();
        bail!("HTTP {} ao baixar {}", response.status(), url);
    }

    let bytes = response
        .bytes()
        .context("Falha ao ler o corpo da resposta")?;

    spinner.finish_and_clear();
    Ok(bytes.to_vec())
}
