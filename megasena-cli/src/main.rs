mod analysis;
mod dataset;
mod display;
mod fetch;
mod import;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::analysis::compute_stats;
use crate::analysis::ranking::{tally, tiers_from_tally};
use crate::dataset::{DrawTable, DATE_COLUMN};
use crate::display::{
    display_draws, display_frequency_chart, display_import_summary, display_stats, display_tiers,
};
use crate::fetch::{fetch_dataset, DEFAULT_DATASET_URL, DEFAULT_TTL_HOURS};
use megasena_db::db::{
    count_draws, db_path, fetch_last_draws, fetch_last_draws_numbers, insert_draw, migrate, open_db,
};
use megasena_db::models::{validate_draw, Draw};

#[derive(Parser)]
#[command(name = "megasena", about = "Analisador de frequências da Mega-Sena")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Baixar o CSV de resultados (ou reutilizar o cache)
    Fetch {
        /// URL do conjunto de dados
        #[arg(short, long, default_value = DEFAULT_DATASET_URL)]
        url: String,

        /// Validade do cache, em horas
        #[arg(long, default_value_t = DEFAULT_TTL_HOURS)]
        ttl: i64,

        /// Forçar novo download mesmo com cache válido
        #[arg(long)]
        refresh: bool,
    },

    /// Importar os sorteios de um arquivo CSV
    Import {
        /// Caminho para o arquivo CSV
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Exibir o caminho da base de dados
    DbPath,

    /// Listar os últimos sorteios
    List {
        /// Número de sorteios a exibir
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Exibir estatísticas (frequências e atrasos)
    Stats {
        /// Janela de análise (número de sorteios)
        #[arg(short, long, default_value = "100")]
        window: u32,
    },

    /// Gerar as três linhas mais frequentes da história
    Tiers {
        /// Arquivo CSV local (se ausente, usa o cache de download)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// URL do conjunto de dados
        #[arg(long, default_value = DEFAULT_DATASET_URL)]
        url: String,

        /// Validade do cache, em horas
        #[arg(long, default_value_t = DEFAULT_TTL_HOURS)]
        ttl: i64,

        /// Forçar novo download mesmo com cache válido
        #[arg(long)]
        refresh: bool,

        /// Nomes das seis colunas de dezenas (separados por vírgulas)
        #[arg(long, default_value = "Ball1,Ball2,Ball3,Ball4,Ball5,Ball6")]
        columns: String,
    },

    /// Adicionar um sorteio manualmente
    Add,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Fetch { url, ttl, refresh } => cmd_fetch(&url, ttl, refresh),
        Command::Import { file } => cmd_import(file),
        Command::DbPath => {
            println!("{}", db_path().display());
            Ok(())
        }
        Command::List { last } => cmd_list(last),
        Command::Stats { window } => cmd_stats(window),
        Command::Tiers {
            file,
            url,
            ttl,
            refresh,
            columns,
        } => cmd_tiers(file, &url, ttl, refresh, &columns),
        Command::Add => cmd_add(),
    }
}

fn open_database() -> Result<megasena_db::rusqlite::Connection> {
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;
    Ok(conn)
}

fn cmd_fetch(url: &str, ttl: i64, refresh: bool) -> Result<()> {
    let outcome = fetch_dataset(url, &fetch::cache_dir(), ttl, refresh)?;
    if outcome.cached {
        println!("Cache válido de {}.", outcome.fetched_at.format("%d/%m/%Y %H:%M UTC"));
    } else {
        println!("Download concluído.");
    }
    println!("{}", outcome.path.display());
    Ok(())
}

fn cmd_import(file: Option<PathBuf>) -> Result<()> {
    let conn = open_database()?;
    let path = match file {
        Some(path) => path,
        None => {
            let outcome = fetch_dataset(
                DEFAULT_DATASET_URL,
                &fetch::cache_dir(),
                DEFAULT_TTL_HOURS,
                false,
            )?;
            outcome.path
        }
    };
    let result = import::import_csv(&conn, &path)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(last: u32) -> Result<()> {
    let conn = open_database()?;
    let n = count_draws(&conn)?;
    if n == 0 {
        println!("Base vazia. Execute primeiro: megasena import");
        return Ok(());
    }
    let draws = fetch_last_draws(&conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(window: u32) -> Result<()> {
    let conn = open_database()?;
    let n = count_draws(&conn)?;
    if n == 0 {
        println!("Base vazia. Execute primeiro: megasena import");
        return Ok(());
    }
    let effective_window = window.min(n);
    let draws = fetch_last_draws_numbers(&conn, effective_window)?;

    let stats = compute_stats(&draws);
    display_stats(&stats, effective_window);
    Ok(())
}

fn cmd_tiers(
    file: Option<PathBuf>,
    url: &str,
    ttl: i64,
    refresh: bool,
    columns: &str,
) -> Result<()> {
    let path = match file {
        Some(path) => path,
        None => fetch_dataset(url, &fetch::cache_dir(), ttl, refresh)?.path,
    };
    let table = DrawTable::from_csv_path(&path)?;
    if table.is_empty() {
        println!("Conjunto de dados vazio. Execute primeiro: megasena fetch --refresh");
        return Ok(());
    }

    let ball_columns = parse_ball_columns(columns)?;
    let tally = match tally(&table, &ball_columns) {
        Ok(tally) => tally,
        Err(e) => {
            eprintln!("Aviso: não foi possível processar os dados ({})", e);
            return Ok(());
        }
    };
    let tiers = match tiers_from_tally(&tally) {
        Ok(tiers) => tiers,
        Err(e) => {
            eprintln!("Aviso: não foi possível processar os dados ({})", e);
            return Ok(());
        }
    };

    display_tiers(&tiers, latest_draw_date(&table).as_deref());
    display_frequency_chart(&tally);
    Ok(())
}

fn parse_ball_columns(raw: &str) -> Result<[String; 6]> {
    let names: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if names.len() != 6 {
        bail!(
            "São esperados exatamente 6 nomes de colunas, recebidos {}",
            names.len()
        );
    }
    Ok([
        names[0].clone(),
        names[1].clone(),
        names[2].clone(),
        names[3].clone(),
        names[4].clone(),
        names[5].clone(),
    ])
}

/// Data do concurso mais recente presente na tabela, para exibição. Datas
/// ilegíveis são ignoradas: isso não faz parte do contrato do ranking.
fn latest_draw_date(table: &DrawTable) -> Option<String> {
    let date_idx = table.column_index(DATE_COLUMN)?;
    (0..table.len())
        .filter_map(|row| table.cell(row, date_idx))
        .filter_map(|raw| import::parse_date(raw).ok())
        .max()
}

fn cmd_add() -> Result<()> {
    let conn = open_database()?;
    println!("Adição manual de um sorteio\n");

    let contest: u32 = prompt("Número do concurso (ex: 2301) : ")?
        .parse()
        .context("Número de concurso inválido")?;
    let raw_date = prompt("Data (DD/MM/AAAA) : ")?;
    let date = import::parse_date(&raw_date)?;

    let balls = prompt_balls()?;

    let draw = Draw {
        contest,
        date,
        balls,
        winners: 0,
        prize: 0.0,
    };

    println!("\nSorteio a inserir:");
    display_draws(&[draw.clone()]);

    let confirm = prompt("\nConfirmar a inserção? (s/n) : ")?;
    if confirm.trim().to_lowercase() == "s" {
        let inserted = insert_draw(&conn, &draw)?;
        if inserted {
            println!("Sorteio inserido com sucesso.");
        } else {
            println!("Este concurso já existe (duplicado ignorado).");
        }
    } else {
        println!("Inserção cancelada.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erro de leitura")?;
    Ok(input.trim().to_string())
}

fn prompt_balls() -> Result<[u8; 6]> {
    loop {
        let input = prompt("6 dezenas (separadas por espaços, 1-60) : ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == 6 => {
                let arr = [v[0], v[1], v[2], v[3], v[4], v[5]];
                if validate_draw(&arr).is_ok() {
                    return Ok(arr);
                }
                println!("Dezenas inválidas (1-60, sem repetições). Tente novamente.");
            }
            _ => println!("Informe exatamente 6 dezenas. Tente novamente."),
        }
    }
}
