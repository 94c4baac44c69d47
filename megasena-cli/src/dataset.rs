use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// Nomes das colunas de dezenas no CSV histórico da Mega-Sena.
pub const DEFAULT_BALL_COLUMNS: [&str; 6] = ["Ball1", "Ball2", "Ball3", "Ball4", "Ball5", "Ball6"];

pub const DATE_COLUMN: &str = "Data";

/// Tabela linha-a-linha tal como saiu do CSV: cabeçalhos ordenados e células
/// ainda em texto. O motor de ranking consome esta estrutura sem saber de onde
/// ela veio (arquivo local ou cache de download).
#[derive(Debug, Clone)]
pub struct DrawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DrawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Não foi possível abrir {:?}", path))?;
        Self::from_csv_reader(reader)
    }

    pub fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader
            .headers()
            .context("Não foi possível ler o cabeçalho do CSV")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context("Não foi possível ler uma linha do CSV")?;
            rows.push(record.iter().map(|c| c.trim().to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}
