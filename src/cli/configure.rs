//! Line-based front end for the persona wizard.

use std::error::Error;
use std::io::{self, BufRead, Write};

use crate::core::persona::{AvatarStyle, PersonaConfig, ResponseStyle};
use crate::core::store::{load_persona, save_persona, FileStore};
use crate::core::wizard::{PersonaWizard, WizardStep, KNOWLEDGE_DOMAINS, PERSONALITY_TRAITS};

pub fn run_configure() -> Result<(), Box<dyn Error>> {
    let mut store = FileStore::open_default()?;
    let current = load_persona(&store);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    match run_wizard(PersonaWizard::from_config(current), stdin.lock(), &mut stdout)? {
        Some(config) => {
            save_persona(&mut store, &config)?;
            println!("✅ Saved persona '{}'", config.name);
        }
        None => println!("Wizard cancelled; nothing saved."),
    }
    Ok(())
}

/// Drives the wizard from `input` until it finishes. Returns `None` when
/// input ends first.
pub fn run_wizard<R: BufRead, W: Write>(
    mut wizard: PersonaWizard,
    mut input: R,
    output: &mut W,
) -> io::Result<Option<PersonaConfig>> {
    loop {
        let step = wizard.step();
        writeln!(
            output,
            "\n[{}/{}] {}",
            step.index() + 1,
            WizardStep::ALL.len(),
            step.title()
        )?;

        let answered = match step {
            WizardStep::BasicInfo => basic_info(&mut wizard, &mut input, output)?,
            WizardStep::Personality => personality(&mut wizard, &mut input, output)?,
            WizardStep::Knowledge => knowledge(&mut wizard, &mut input, output)?,
        };
        if !answered {
            return Ok(None);
        }

        if step.is_last() {
            match wizard.finish() {
                Ok(config) => return Ok(Some(config)),
                Err(err) => writeln!(output, "⚠️  {err}")?,
            }
        } else if let Err(err) = wizard.next() {
            writeln!(output, "⚠️  {err}")?;
        }
    }
}

fn basic_info<R: BufRead, W: Write>(
    wizard: &mut PersonaWizard,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    let current = wizard.draft().name.clone();
    let Some(name) = prompt(input, output, &format!("Bot name [{current}]"))? else {
        return Ok(false);
    };
    if !name.is_empty() {
        wizard.set_name(name);
    }

    let current = wizard.draft().avatar;
    let options = join_options(AvatarStyle::ALL.iter().map(|a| a.as_str()));
    let Some(answer) = prompt(input, output, &format!("Avatar style ({options}) [{current}]"))?
    else {
        return Ok(false);
    };
    if let Some(avatar) = AvatarStyle::ALL
        .into_iter()
        .find(|a| a.as_str().eq_ignore_ascii_case(&answer))
    {
        wizard.set_avatar(avatar);
    }
    Ok(true)
}

fn personality<R: BufRead, W: Write>(
    wizard: &mut PersonaWizard,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    print_catalog(output, PERSONALITY_TRAITS, &wizard.draft().personality_traits)?;
    let Some(answer) = prompt(input, output, "Toggle traits (numbers or names, comma-separated)")?
    else {
        return Ok(false);
    };
    for label in parse_selection(&answer, PERSONALITY_TRAITS) {
        wizard.toggle_trait(&label);
    }

    let current = wizard.draft().response_style;
    let options = join_options(ResponseStyle::ALL.iter().map(|s| s.as_str()));
    let Some(answer) = prompt(input, output, &format!("Response style ({options}) [{current}]"))?
    else {
        return Ok(false);
    };
    if let Some(style) = ResponseStyle::ALL
        .into_iter()
        .find(|s| s.as_str().eq_ignore_ascii_case(&answer))
    {
        wizard.set_response_style(style);
    }
    Ok(true)
}

fn knowledge<R: BufRead, W: Write>(
    wizard: &mut PersonaWizard,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    print_catalog(output, KNOWLEDGE_DOMAINS, &wizard.draft().knowledge_domains)?;
    let Some(answer) = prompt(input, output, "Toggle domains (numbers or names, comma-separated)")?
    else {
        return Ok(false);
    };
    for label in parse_selection(&answer, KNOWLEDGE_DOMAINS) {
        wizard.toggle_domain(&label);
    }

    let current = wizard.draft().temperature;
    let Some(answer) = prompt(input, output, &format!("Temperature 0.0-1.0 [{current}]"))? else {
        return Ok(false);
    };
    if let Ok(value) = answer.parse::<f64>() {
        wizard.set_temperature(value);
    }

    let current = wizard.draft().max_tokens;
    let Some(answer) = prompt(input, output, &format!("Max tokens 256-2048 [{current}]"))? else {
        return Ok(false);
    };
    if let Ok(value) = answer.parse::<u32>() {
        wizard.set_max_tokens(value);
    }
    Ok(true)
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> io::Result<Option<String>> {
    write!(output, "{label}: ")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn print_catalog<W: Write>(output: &mut W, catalog: &[&str], selected: &[String]) -> io::Result<()> {
    for (index, label) in catalog.iter().enumerate() {
        let mark = if selected.iter().any(|s| s == label) {
            "x"
        } else {
            " "
        };
        writeln!(output, "  [{mark}] {}. {label}", index + 1)?;
    }
    for custom in selected.iter().filter(|s| !catalog.contains(&s.as_str())) {
        writeln!(output, "  [x] {custom}")?;
    }
    Ok(())
}

/// Resolves `1, 3, Curious` against the catalog; unknown names are kept as
/// custom labels.
fn parse_selection(answer: &str, catalog: &[&str]) -> Vec<String> {
    answer
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.parse::<usize>() {
            Ok(n) if (1..=catalog.len()).contains(&n) => catalog[n - 1].to_string(),
            _ => catalog
                .iter()
                .find(|label| label.eq_ignore_ascii_case(item))
                .map(|label| label.to_string())
                .unwrap_or_else(|| item.to_string()),
        })
        .collect()
}

fn join_options<'a>(options: impl Iterator<Item = &'a str>) -> String {
    options.collect::<Vec<_>>().join("/")
}
