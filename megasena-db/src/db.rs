use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::{Draw, BALLS_PER_DRAW};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    contest   INTEGER PRIMARY KEY,
    date      TEXT NOT NULL,
    ball_1    INTEGER NOT NULL,
    ball_2    INTEGER NOT NULL,
    ball_3    INTEGER NOT NULL,
    ball_4    INTEGER NOT NULL,
    ball_5    INTEGER NOT NULL,
    ball_6    INTEGER NOT NULL,
    winners   INTEGER NOT NULL DEFAULT 0,
    prize     REAL NOT NULL DEFAULT 0.0
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("megasena.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Não foi possível criar o diretório {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Não foi possível abrir a base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Falha na migração do esquema")?;
    Ok(())
}

pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (contest, date, ball_1, ball_2, ball_3, ball_4, ball_5, ball_6, winners, prize)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            draw.contest,
            draw.date,
            draw.balls[0],
            draw.balls[1],
            draw.balls[2],
            draw.balls[3],
            draw.balls[4],
            draw.balls[5],
            draw.winners,
            draw.prize,
        ],
    ).context("Falha na inserção")?;
    Ok(changed > 0)
}

pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT contest, date, ball_1, ball_2, ball_3, ball_4, ball_5, ball_6, winners, prize
         FROM draws ORDER BY date DESC, contest DESC LIMIT ?1"
    )?;
    let draws = stmt.query_map([limit], |row| {
        Ok(Draw {
            contest: row.get(0)?,
            date: row.get(1)?,
            balls: [
                row.get::<_, u8>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, u8>(4)?,
                row.get::<_, u8>(5)?,
                row.get::<_, u8>(6)?,
                row.get::<_, u8>(7)?,
            ],
            winners: row.get(8)?,
            prize: row.get(9)?,
        })
    })?.collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn fetch_last_draws_numbers(conn: &Connection, limit: u32) -> Result<Vec<[u8; BALLS_PER_DRAW]>> {
    let mut stmt = conn.prepare(
        "SELECT ball_1, ball_2, ball_3, ball_4, ball_5, ball_6
         FROM draws ORDER BY date DESC, contest DESC LIMIT ?1"
    )?;
    let rows = stmt.query_map([limit], |row| {
        Ok([
            row.get::<_, u8>(0)?,
            row.get::<_, u8>(1)?,
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, u8>(4)?,
            row.get::<_, u8>(5)?,
        ])
    })?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

pub fn latest_draw_date(conn: &Connection) -> Result<Option<String>> {
    let date: Option<String> = conn.query_row("SELECT MAX(date) FROM draws", [], |row| row.get(0))?;
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_draw(contest: u32, date: &str) -> Draw {
        Draw {
            contest,
            date: date.to_string(),
            balls: [4, 13, 23, 33, 41, 52],
            winners: 0,
            prize: 0.0,
        }
    }

    #[test]
    fn test_insert_and_count() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 0);

        insert_draw(&conn, &test_draw(1, "1996-03-11")).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_ignored() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let inserted = insert_draw(&conn, &test_draw(1, "1996-03-11")).unwrap();
        assert!(inserted);
        let inserted = insert_draw(&conn, &test_draw(1, "1996-03-11")).unwrap();
        assert!(!inserted);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_fetch_order() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        insert_draw(&conn, &test_draw(1, "2024-01-01")).unwrap();
        insert_draw(&conn, &test_draw(2, "2024-01-06")).unwrap();
        insert_draw(&conn, &test_draw(3, "2024-01-03")).unwrap();

        let draws = fetch_last_draws(&conn, 10).unwrap();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].date, "2024-01-06");
        assert_eq!(draws[1].date, "2024-01-03");
        assert_eq!(draws[2].date, "2024-01-01");
    }

    #[test]
    fn test_latest_draw_date() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(latest_draw_date(&conn).unwrap(), None);

        insert_draw(&conn, &test_draw(1, "2024-01-01")).unwrap();
        insert_draw(&conn, &test_draw(2, "2024-01-06")).unwrap();
        assert_eq!(latest_draw_date(&conn).unwrap().as_deref(), Some("2024-01-06"));
    }
}
