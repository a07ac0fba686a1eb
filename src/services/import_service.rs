// src/services/import_service.rs
use crate::models::student::NewStudent;
use csv::{ReaderBuilder, StringRecord, Trim};

/// Converte texto CSV em registos de alunos.
///
/// Colunas: nome, número, pai (opcional), contacto (opcional). A primeira
/// linha só é tratada como cabeçalho se contiver "name" e "roll". Linhas
/// com menos de dois campos, ou que o leitor não consiga interpretar, são
/// ignoradas. Linhas em branco não contam.
///
/// Cada linha é lida à parte: uma aspa por fechar só estraga a própria linha.
pub fn parse_roster_csv(text: &str) -> Vec<NewStudent> {
    let mut records = Vec::new();
    let mut first = true;

    for line in text.lines() {
        // Linhas só com espaços contam como vazias
        if line.trim().is_empty() {
            continue;
        }

        let row = match parse_line(line) {
            Some(row) => row,
            None => {
                first = false;
                continue;
            }
        };

        if std::mem::take(&mut first) && is_header(&row) {
            tracing::debug!("Import: cabeçalho detetado, ignorando primeira linha");
            continue;
        }

        if row.len() < 2 {
            tracing::debug!("Import: linha curta ignorada: {}", line);
            continue;
        }

        let field = |i: usize| row.get(i).unwrap_or("");
        records.push(NewStudent::new(field(0), field(1)).with_details(field(2), field(3)));
    }

    tracing::debug!("Import: {} linhas candidatas lidas", records.len());
    records
}

fn parse_line(line: &str) -> Option<StringRecord> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());

    match reader.records().next()? {
        Ok(row) => Some(row),
        Err(e) => {
            tracing::debug!("Import: linha CSV inválida ignorada: {}", e);
            None
        }
    }
}

fn is_header(row: &StringRecord) -> bool {
    let line = row.iter().collect::<Vec<_>>().join(",").to_lowercase();
    line.contains("name") && line.contains("roll")
}
