//! Downloadable import template

/// Suggested filename for the template
pub const TEMPLATE_FILENAME: &str = "modelo_importacao_celulas.csv";

/// Column order of the template
pub const TEMPLATE_HEADER: &str = "geracao,cor_geracao,celula,dia_semana,horario,endereco,publico_alvo,lider_nome,lider_email,lider_telefone,senha";

const TEMPLATE_ROWS: [&str; 2] = [
    "Geração Azul,#1D4ED8,Célula Esperança,quarta,19:30,Rua das Flores 120 - Centro,Jovens,Ana Souza,ana.souza@exemplo.com,(11) 98765-4321,",
    "Geração Verde,#15803D,Célula Vida Nova,sabado,16:00,Av. Brasil 455 - Jardim América,Casais,Bruno Lima,bruno.lima@exemplo.com,(21) 99876-5432,Senha@2024",
];

/// Template text: header plus two example rows that pass validation
pub fn template_csv() -> String {
    let mut text = String::from(TEMPLATE_HEADER);
    text.push('\n');
    for row in TEMPLATE_ROWS {
        text.push_str(row);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ingest::validate_csv;

    #[test]
    fn test_template_header_is_exact() {
        let template = template_csv();
        assert_eq!(template.lines().next(), Some(TEMPLATE_HEADER));
        assert_eq!(template.lines().count(), 3);
    }

    #[test]
    fn test_template_rows_validate() {
        let validated = validate_csv(&template_csv());
        assert!(validated.errors.is_empty(), "{:?}", validated.errors);
        assert_eq!(validated.rows.len(), 2);
    }
}
