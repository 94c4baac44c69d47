use anyhow::{bail, Context, Result};
use megasena_db::rusqlite::Connection;
use std::path::Path;

use megasena_db::db::insert_draw;
use megasena_db::models::{validate_draw, Draw};

use crate::dataset::{DATE_COLUMN, DEFAULT_BALL_COLUMNS};

const CONTEST_COLUMN: &str = "Concurso";
const WINNERS_COLUMN: &str = "Winners";
const PRIZE_COLUMN: &str = "Prize";

/// Converte valores monetários no formato brasileiro ("1.234.567,89").
pub fn parse_brazilian_decimal(s: &str) -> Result<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    let normalized = s.replace('.', "").replace(',', ".");
    normalized
        .parse::<f64>()
        .with_context(|| format!("Não foi possível converter o número: '{}'", s))
}

pub fn parse_date(raw: &str) -> Result<String> {
    let parts: Vec<&str> = raw.trim().split('/').collect();
    if parts.len() != 3 {
        bail!("Formato de data inválido: '{}'", raw);
    }
    Ok(format!("{}-{}-{}", parts[2], parts[1], parts[0]))
}

struct ColumnMap {
    contest: usize,
    date: usize,
    balls: [usize; 6],
    winners: Option<usize>,
    prize: Option<usize>,
}

fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnMap> {
    let find = |name: &str| headers.iter().position(|h| h.trim() == name);
    let require = |name: &str| {
        find(name).with_context(|| format!("Coluna obrigatória ausente no CSV: '{}'", name))
    };

    let mut balls = [0usize; 6];
    for (slot, name) in DEFAULT_BALL_COLUMNS.iter().enumerate() {
        balls[slot] = require(name)?;
    }

    Ok(ColumnMap {
        contest: require(CONTEST_COLUMN)?,
        date: require(DATE_COLUMN)?,
        balls,
        winners: find(WINNERS_COLUMN),
        prize: find(PRIZE_COLUMN),
    })
}

fn parse_record(record: &csv::StringRecord, columns: &ColumnMap) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Campo ausente no índice {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Não foi possível converter '{}' (índice {})", s, idx))
    };

    let contest_raw = get(columns.contest)?;
    let contest: u32 = contest_raw
        .parse()
        .with_context(|| format!("Número de concurso inválido: '{}'", contest_raw))?;
    let date = parse_date(&get(columns.date)?)?;

    let mut balls = [0u8; 6];
    for (slot, &idx) in columns.balls.iter().enumerate() {
        balls[slot] = get_u8(idx)?;
    }
    validate_draw(&balls)?;

    let winners: i32 = columns
        .winners
        .and_then(|idx| get(idx).ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let prize = columns
        .prize
        .and_then(|idx| get(idx).ok())
        .and_then(|s| parse_brazilian_decimal(&s).ok())
        .unwrap_or(0.0);

    Ok(Draw {
        contest,
        date,
        balls,
        winners,
        prize,
    })
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Não foi possível abrir {:?}", path))?;

    let headers = reader
        .headers()
        .context("Não foi possível ler o cabeçalho do CSV")?
        .clone();
    let columns = resolve_columns(&headers)?;

    let tx = conn
        .unchecked_transaction()
        .context("Não foi possível iniciar a transação")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match parse_record(&record, &columns) {
                Ok(draw) => match insert_draw(&tx, &draw) {
                    Ok(true) => result.inserted += 1,
                    Ok(false) => result.skipped += 1,
                    Err(e) => {
                        eprintln!("Erro ao inserir o registro {}: {}", result.total_records, e);
                        result.errors += 1;
                    }
                },
                Err(e) => {
                    eprintln!("Erro ao interpretar a linha {}: {}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                eprintln!("Erro ao ler a linha {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Falha ao confirmar a transação")?;
    Ok(result)
}
