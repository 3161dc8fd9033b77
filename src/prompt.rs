use crate::models::SymptomReport;

const INSTRUCTIONS: &str = r#"Please provide:
1. **Symptom Summary**: Brief overview of the reported symptoms
2. **Possible Conditions**: List potential conditions that could cause these symptoms (for educational purposes only)
3. **Recommended Next Steps**: What the person should consider doing
4. **When to Seek Immediate Care**: Signs that require urgent medical attention

Important: Include a clear disclaimer that this is for educational purposes only and not a substitute for professional medical diagnosis or treatment."#;

/// Build the natural-language prompt for one report. Age, when given, rides on
/// the duration line.
pub fn build_prompt(report: &SymptomReport) -> String {
    let age_info = report
        .age
        .map(|age| format!(", age: {age}"))
        .unwrap_or_default();

    format!(
        "As a healthcare AI assistant, analyze these symptoms and provide educational information:\n\n\
         Symptoms: {symptoms}\n\
         Gender: {gender}\n\
         Severity: {severity}\n\
         Duration: {duration}{age_info}\n\n\
         {INSTRUCTIONS}",
        symptoms = report.symptoms,
        gender = report.gender,
        severity = report.severity,
        duration = report.duration,
    )
}
