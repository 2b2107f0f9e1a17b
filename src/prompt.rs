//! Prompt assembly for the legal-report generator.
//!
//! The prompt is the fixed report template followed by three labeled
//! sections, always in this order: the user's instruction, the knowledge
//! corpus, the process text. Inputs are inserted verbatim.

/// Instruction used when the request does not carry one.
pub const DEFAULT_INSTRUCTION: &str = "Gerar o relatório, parecer e voto completo.";

const INSTRUCTION_HEADING: &str = "=== INSTRUÇÃO DO USUÁRIO ===";
const KNOWLEDGE_HEADING: &str = "=== BASE DE CONHECIMENTO (LEGISLAÇÃO E REFERÊNCIAS) ===";
const PROCESS_HEADING: &str = "=== PROCESSO ADMINISTRATIVO EM ANÁLISE ===";

const REPORT_TEMPLATE: &str = r#"Você é um assessor jurídico especializado em processos administrativos. Sua tarefa é redigir, em português formal, uma peça técnica completa a partir do processo administrativo fornecido, fundamentando-se exclusivamente na base de conhecimento anexada e nos fatos que constam dos autos.

A peça deve seguir rigorosamente o modelo abaixo.

CABEÇALHO
- PROCESSO Nº: número do processo, exatamente como consta dos autos
- INTERESSADO: nome completo do interessado ou requerente
- ASSUNTO: descrição sucinta do objeto do pedido
- RELATOR: nome do relator, se indicado; caso contrário, deixar "[a definir]"
- DATA: deixar "[data da sessão]"

RELATÓRIO
- Narre em ordem cronológica os fatos relevantes, os pedidos formulados e os documentos juntados.
- Indique as folhas ou documentos dos autos que sustentam cada afirmação, quando disponíveis.
- Registre as manifestações técnicas e jurídicas já emitidas no processo.
- Não emita juízo de valor nesta seção.

PARECER
- Delimite as questões jurídicas a serem enfrentadas.
- Analise cada questão à luz da legislação e das referências da base de conhecimento, citando artigo, inciso e diploma normativo.
- Aponte eventuais vícios formais, lacunas de instrução ou documentos faltantes.
- Conclua de forma fundamentada pelo deferimento, deferimento parcial ou indeferimento do pedido.

VOTO
- Apresente a proposta de decisão em linguagem objetiva e dispositiva.
- Especifique as providências a serem adotadas e os responsáveis, quando couber.
- Encerre com local, data e espaço para assinatura do relator.

Regras gerais:
- Não invente fatos, números, datas ou normas que não constem dos autos ou da base de conhecimento.
- Quando uma informação necessária não estiver disponível, sinalize-a entre colchetes.
- Utilize títulos em caixa alta para cada seção (CABEÇALHO, RELATÓRIO, PARECER, VOTO)."#;

/// Build the final prompt.
///
/// Pure: the same inputs always produce the same bytes, and the output grows
/// linearly with the inputs (nothing is truncated here; see
/// [`check_prompt_size`]).
pub fn assemble_prompt(instruction: &str, knowledge: &str, process: &str) -> String {
    let mut prompt = String::with_capacity(
        REPORT_TEMPLATE.len() + instruction.len() + knowledge.len() + process.len() + 256,
    );

    prompt.push_str(REPORT_TEMPLATE);
    push_section(&mut prompt, INSTRUCTION_HEADING, instruction);
    push_section(&mut prompt, KNOWLEDGE_HEADING, knowledge);
    push_section(&mut prompt, PROCESS_HEADING, process);
    prompt.push('\n');
    prompt
}

fn push_section(prompt: &mut String, heading: &str, body: &str) {
    prompt.push_str("\n\n");
    prompt.push_str(heading);
    prompt.push_str("\n\n");
    prompt.push_str(body);
}

#[derive(Debug, thiserror::Error)]
#[error("assembled prompt has {chars} characters, limit is {max}")]
pub struct PromptTooLarge {
    pub chars: usize,
    pub max: usize,
}

/// Reject prompts longer than `max_chars` characters.
pub fn check_prompt_size(prompt: &str, max_chars: usize) -> Result<(), PromptTooLarge> {
    let chars = prompt.chars().count();
    if chars > max_chars {
        return Err(PromptTooLarge {
            chars,
            max: max_chars,
        });
    }
    Ok(())
}
