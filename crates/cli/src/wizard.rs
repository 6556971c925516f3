//! Line-oriented form wizard.
//!
//! Prompts each field of the controller's current step, then advances (or submits
//! on the final step). `:back` returns to the previous step and `:quit` leaves with
//! progress saved. An empty answer keeps the value shown in brackets; `:clear`
//! empties the field (unticks a flag, detaches a file).

use anyhow::Context;
use camp_core::{
    FieldDef, FieldKind, FieldValue, FormController, FormError, Phase, Receipt, SubmitError,
    SubmissionSink, Upload, ValidationErrors,
};
use std::io::{BufRead, Write};
use std::path::Path;

const BACK: &str = ":back";
const QUIT: &str = ":quit";
const CLEAR: &str = ":clear";

/// How a wizard session ended.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Submitted(Receipt),
    /// The user quit or input ended; progress is saved.
    Quit,
}

enum Answer {
    Keep,
    Set(FieldValue),
    Attach(Upload),
    Back,
    Quit,
}

pub async fn run<S, R, W>(
    controller: &mut FormController,
    sink: &S,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<Outcome>
where
    S: SubmissionSink,
    R: BufRead,
    W: Write,
{
    writeln!(
        output,
        "{} ({} pasos). Escribe {BACK} para volver, {CLEAR} para borrar o {QUIT} para salir.",
        controller.definition().id,
        controller.definition().step_count()
    )?;

    'steps: loop {
        if controller.phase() == Phase::Submitted {
            anyhow::bail!("form has already been submitted");
        }

        let step = controller.current_step();
        writeln!(
            output,
            "\nPaso {}/{}: {}",
            step.index,
            controller.definition().step_count(),
            step.title
        )?;

        for field in &step.fields {
            let answer = loop {
                prompt(field, controller, output)?;
                let Some(line) = read_line(input)? else {
                    break Answer::Quit;
                };
                match parse_answer(field, &line) {
                    Ok(answer) => break answer,
                    Err(message) => writeln!(output, "  ! {message}")?,
                }
            };

            match answer {
                Answer::Keep => {}
                Answer::Set(value) => controller.update_field(field.name, value)?,
                Answer::Attach(upload) => match controller.attach_file(field.name, &upload) {
                    Ok(file) => writeln!(
                        output,
                        "  adjunto: {} ({} bytes)",
                        file.file_name, file.size_bytes
                    )?,
                    Err(FormError::UploadRejected { message, .. }) => {
                        writeln!(output, "  ! {message}")?
                    }
                    Err(e) => return Err(e.into()),
                },
                Answer::Back => {
                    controller.retreat_step();
                    continue 'steps;
                }
                Answer::Quit => {
                    controller.save()?;
                    writeln!(output, "\nProgreso guardado.")?;
                    return Ok(Outcome::Quit);
                }
            }
        }

        if !controller.is_final_step() {
            if let Err(errors) = controller.advance_step() {
                print_errors(&errors, output)?;
            }
            continue;
        }

        match controller.submit(sink).await {
            Ok(receipt) => {
                match &receipt {
                    Receipt::Appended => writeln!(output, "\n¡Formulario enviado!")?,
                    Receipt::Order {
                        order_id,
                        payment_url,
                    } => writeln!(
                        output,
                        "\nPedido {order_id} creado. Completa el pago en:\n  {payment_url}"
                    )?,
                }
                return Ok(Outcome::Submitted(receipt));
            }
            Err(SubmitError::Invalid(errors)) => print_errors(&errors, output)?,
            Err(SubmitError::Transport(reason)) => {
                tracing::warn!("Submission failed: {}", reason);
                print_errors(controller.errors(), output)?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn prompt<W: Write>(
    field: &FieldDef,
    controller: &FormController,
    output: &mut W,
) -> anyhow::Result<()> {
    if let FieldKind::Choice(choices) = field.kind {
        writeln!(output, "{}:", field.label)?;
        for (i, (id, label)) in choices.iter().enumerate() {
            writeln!(output, "  {}) {label} [{id}]", i + 1)?;
        }
    }
    let hint = match field.kind {
        FieldKind::Flag => " (s/n)",
        FieldKind::File => " (ruta del archivo)",
        FieldKind::Date => " (AAAA-MM-DD)",
        _ => "",
    };
    let current = controller.record().get(field.name).to_cell();
    if current.is_empty() {
        write!(output, "{}{hint}: ", field.label)?;
    } else {
        write!(output, "{}{hint} [{current}]: ", field.label)?;
    }
    output.flush()?;
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> anyhow::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line).context("reading answer")? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn parse_answer(field: &FieldDef, line: &str) -> Result<Answer, String> {
    match line {
        "" => return Ok(Answer::Keep),
        BACK => return Ok(Answer::Back),
        QUIT => return Ok(Answer::Quit),
        CLEAR => return Ok(Answer::Set(cleared(field))),
        _ => {}
    }

    match field.kind {
        FieldKind::Flag => match line.to_lowercase().as_str() {
            "s" | "si" | "sí" | "y" | "yes" => Ok(Answer::Set(FieldValue::Bool(true))),
            "n" | "no" => Ok(Answer::Set(FieldValue::Bool(false))),
            _ => Err("Responde s o n".into()),
        },
        FieldKind::Choice(choices) => {
            let by_number = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| choices.get(i));
            by_number
                .or_else(|| choices.iter().find(|(id, _)| *id == line))
                .map(|(id, _)| Answer::Set(FieldValue::text(*id)))
                .ok_or_else(|| "Elige un número o identificador de la lista".to_string())
        }
        FieldKind::File => read_upload(Path::new(line)).map(Answer::Attach),
        _ => Ok(Answer::Set(FieldValue::text(line))),
    }
}

/// The empty value for `field`'s kind.
fn cleared(field: &FieldDef) -> FieldValue {
    match field.kind {
        FieldKind::Flag => FieldValue::Bool(false),
        FieldKind::File => FieldValue::Null,
        _ => FieldValue::text(""),
    }
}

fn read_upload(path: &Path) -> Result<Upload, String> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("No se pudo leer {}: {e}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Upload::new(file_name, None, bytes))
}

fn print_errors<W: Write>(errors: &ValidationErrors, output: &mut W) -> anyhow::Result<()> {
    writeln!(output, "\nRevisa los siguientes campos:")?;
    for (field, message) in errors.iter() {
        writeln!(output, "  - {field}: {message}")?;
    }
    Ok(())
}
