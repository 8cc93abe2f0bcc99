pub const ANALYST_SYSTEM_PROMPT: &str = r#"You are a senior venture analyst. You read raw material about an early-stage company and write a concise, factual one-page analysis. Never invent facts that are not supported by the material; write "unknown" instead."#;

pub fn build_analysis_prompt(document: &str) -> String {
    format!(
        r#"Analyze the startup described in the document below.

Start your answer with these labelled lines, one per line, exactly as written (leave a label out if the document does not say):
公司名称: <company name>
行业: <sector / industry>
价值主张: <one-sentence value proposition>
创始人: <founder name>
成立时间: <founding date as YYYY-MM-DD>
简介: <one-sentence product description>

Then write the analysis in Markdown with these sections:
1. Story line (pain point, solution, why now)
2. Founders and team
3. Product and traction
4. Market and competition
5. Funding
6. Risks and catalysts
7. Investment view (Invest / Track / Pass) with a one-sentence key insight

DOCUMENT:
{}"#,
        document
    )
}

pub const SCORING_SYSTEM_PROMPT: &str =
    "You are a venture analyst who answers with a single JSON object and nothing else.";

pub fn build_scoring_prompt(document: &str) -> String {
    format!(
        r#"Score the startup described below on five dimensions, each from 0 to 10.

SCHEMA:
{{"people": 0, "market": 0, "traction": 0, "moat": 0, "financing": 0}}

RULES:
- people: founder and team strength
- market: size and momentum of the market
- traction: evidence of product usage or revenue
- moat: defensibility against competitors
- financing: funding secured relative to stage
- Output ONLY the JSON object, no markdown, no explanations

DOCUMENT:
{}

JSON OUTPUT:"#,
        document
    )
}
