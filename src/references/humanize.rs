//! English number rendering for the `Humanizer` package

const UNITS: [&str; 20] = [
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(u64, &str); 7] = [
    (1_000_000_000_000_000_000, "quintillion"),
    (1_000_000_000_000_000, "quadrillion"),
    (1_000_000_000_000, "trillion"),
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1_000, "thousand"),
    (100, "hundred"),
];

/// `1` → `1st`, `12` → `12th`, `23` → `23rd`
pub fn ordinal(n: i64) -> String {
    let abs = n.unsigned_abs();
    let suffix = match (abs % 100, abs % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// `42` → `forty-two`, `1001` → `one thousand and one`
pub fn words(n: i64) -> String {
    if n < 0 {
        return format!("minus {}", unsigned_words(n.unsigned_abs()));
    }
    unsigned_words(n.unsigned_abs())
}

fn unsigned_words(mut n: u64) -> String {
    if n == 0 {
        return UNITS[0].to_string();
    }

    let mut parts = Vec::new();
    for (scale, name) in SCALES {
        if n / scale > 0 {
            parts.push(format!("{} {}", unsigned_words(n / scale), name));
            n %= scale;
        }
    }

    if n > 0 {
        if !parts.is_empty() {
            parts.push("and".to_string());
        }
        if n < 20 {
            parts.push(UNITS[n as usize].to_string());
        } else {
            let tens = TENS[(n / 10) as usize];
            match n % 10 {
                0 => parts.push(tens.to_string()),
                unit => parts.push(format!("{}-{}", tens, UNITS[unit as usize])),
            }
        }
    }

    parts.join(" ")
}
