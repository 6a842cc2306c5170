//! Number Words

/// Render a deliverable quantity the way contract prose expects it.
///
/// Quantities one to five are spelled out, anything larger stays numeric.
pub fn quantity_word(quantity: u32) -> String {
    match quantity {
        1 => "One".to_string(),
        2 => "Two".to_string(),
        3 => "Three".to_string(),
        4 => "Four".to_string(),
        5 => "Five".to_string(),
        other => other.to_string(),
    }
}

/// Spell out a whole number using the Indian numbering system
/// (Crore, Lakh, Thousand, Hundred).
pub fn indian_number_words(value: u64) -> String {
    if value == 0 {
        return "Zero".to_string();
    }

    let crores = value / 10_000_000;
    let lakhs = (value / 100_000) % 100;
    let thousands = (value / 1_000) % 100;
    let hundreds = value % 1_000;

    let mut parts: Vec<String> = Vec::with_capacity(4);

    if crores > 0 {
        parts.push(format!("{} Crore", indian_number_words(crores)));
    }

    if lakhs > 0 {
        parts.push(format!("{} Lakh", below_hundred(lakhs)));
    }

    if thousands > 0 {
        parts.push(format!("{} Thousand", below_hundred(thousands)));
    }

    if hundreds > 0 {
        parts.push(below_thousand(hundreds));
    }

    parts.join(" ")
}

fn below_thousand(value: u64) -> String {
    let hundreds = value / 100;
    let rest = value % 100;

    match (hundreds, rest) {
        (0, rest) => below_hundred(rest),
        (hundreds, 0) => format!("{} Hundred", unit_word(hundreds)),
        (hundreds, rest) => format!("{} Hundred {}", unit_word(hundreds), below_hundred(rest)),
    }
}

fn below_hundred(value: u64) -> String {
    if value < 20 {
        return unit_word(value).to_string();
    }

    let tens = tens_word(value / 10);

    match value % 10 {
        0 => tens.to_string(),
        units => format!("{tens} {}", unit_word(units)),
    }
}

fn unit_word(value: u64) -> &'static str {
    match value {
        1 => "One",
        2 => "Two",
        3 => "Three",
        4 => "Four",
        5 => "Five",
        6 => "Six",
        7 => "Seven",
        8 => "Eight",
        9 => "Nine",
        10 => "Ten",
        11 => "Eleven",
        12 => "Twelve",
        13 => "Thirteen",
        14 => "Fourteen",
        15 => "Fifteen",
        16 => "Sixteen",
        17 => "Seventeen",
        18 => "Eighteen",
        19 => "Nineteen",
        _ => "Zero",
    }
}

fn tens_word(value: u64) -> &'static str {
    match value {
        2 => "Twenty",
        3 => "Thirty",
        4 => "Forty",
        5 => "Fifty",
        6 => "Sixty",
        7 => "Seventy",
        8 => "Eighty",
        9 => "Ninety",
        _ => "",
    }
}
