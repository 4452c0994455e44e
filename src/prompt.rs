//! Recipe prompt construction and output cleanup

const JSON_MARKER: &str = "```json";

/// Build the recipe prompt for a sandwich idea.
pub fn recipe_prompt(idea: &str) -> String {
    format!(
        r#"Genereer een eenvoudig recept voor een broodje gebaseerd op het volgende idee: '{idea}'.
Beschrijf de benodigde ingrediënten met geschatte hoeveelheden voor één broodje.
Beschrijf de bereidingsstappen duidelijk en beknopt.
Houd het recept praktisch en gericht op een snelle bereiding.
Formatteer het antwoord netjes met duidelijke kopjes voor Ingrediënten en Bereiding.
Bevat GEEN json block aan het einde van je antwoord."#
    )
}

/// Drop a trailing JSON block the model may append despite the prompt.
pub fn clean_recipe(text: &str) -> String {
    match text.find(JSON_MARKER) {
        Some(idx) => text[..idx].trim().to_string(),
        None => text.trim().to_string(),
    }
}
