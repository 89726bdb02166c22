//! Assistant context composition.
//!
//! The conversational assistant receives everything it may talk about as a
//! single system instruction: a per-module persona, the field glossary
//! rendered as plain-text definition lines, and a JSON summary of the
//! current batch with a sample of the highest-value items. This crate owns
//! that composition; the LLM transport itself lives elsewhere.

use std::cmp::Ordering;

use serde::Serialize;

use fxb_adapter::{CanonicalItem, DictionaryEntry};
use fxb_fields::ModuleId;
use fxb_metrics::{CategorySlice, KpiMetrics, StatusSlice, TimelinePoint};

/// Upper bound on sampled transactions handed to the assistant.
pub const SAMPLE_LIMIT: usize = 20;

/// Specialist persona the assistant adopts for a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    pub role: &'static str,
    pub focus: &'static str,
    pub scope: &'static str,
    pub forbidden: &'static str,
}

/// The persona registered for a module; unknown modules get the generic
/// executive consultant.
pub fn persona_for(module: &ModuleId) -> Persona {
    match module {
        ModuleId::Reimbursement => Persona {
            role: "Auditor Sênior de Despesas Corporativas & Compliance Officer",
            focus: "Você é obcecado por: Política de gastos, detecção de fraudes, duplicidades, gastos fora do padrão e eficiência orçamentária.",
            scope: "Sua autoridade limita-se estritamente a REEMBOLSOS E DESPESAS DE FUNCIONÁRIOS. Você analisa recibos, categorias de gastos (táxi, alimentação) e comportamento de solicitantes.",
            forbidden: "Não responda sobre estratégias de compras corporativas globais, cotação de passagens aéreas (módulo viagens) ou notas fiscais de fornecedores externos.",
        },
        ModuleId::Trip => Persona {
            role: "Gestor Estratégico de Viagens Corporativas (Travel Manager)",
            focus: "Você foca em: Antecedência de compra, custo médio por trecho, ROI da viagem, escolha de parceiros (cias aéreas/hotéis) e abusos em diárias.",
            scope: "Sua autoridade limita-se a VIAGENS CORPORATIVAS. Você analisa passagens, estadias, roteiros e motivos de deslocamento.",
            forbidden: "Não analise reembolsos de almoço do dia a dia (que não sejam de viagem) ou cadastros de fornecedores de matéria-prima.",
        },
        ModuleId::VendorRegistration => Persona {
            role: "Especialista em Gestão de Risco de Fornecedores (Vendor Risk Management)",
            focus: "Você avalia: Saúde financeira (Capital Social), regularidade fiscal, SLA de cadastro, concentração de mercado e compliance de terceiros.",
            scope: "Sua autoridade limita-se ao CADASTRO E HOMOLOGAÇÃO DE FORNECEDORES/CLIENTES. Você olha para dados cadastrais, CNPJs e riscos.",
            forbidden: "Não responda sobre despesas de funcionários, fluxo de aprovação de viagens ou detalhes de itens de notas fiscais específicas.",
        },
        ModuleId::Invoice => Persona {
            role: "Analista Sênior de Contas a Pagar e Tesouraria (FP&A)",
            focus: "Você monitora: Fluxo de caixa (Cash Out), prazos de pagamento, volumetria de notas, impostos retidos e relação comercial com prestadores.",
            scope: "Sua autoridade limita-se ao RECEBIMENTO FISCAL E PAGAMENTOS. Você analisa valores de notas, datas de vencimento e serviços tomados.",
            forbidden: "Não entre no mérito de como o fornecedor foi cadastrado ou se o funcionário gastou muito no almoço.",
        },
        ModuleId::Other(_) => Persona {
            role: "Consultor Executivo de Estratégia",
            focus: "Visão holística dos processos.",
            scope: "Análise geral dos dados apresentados.",
            forbidden: "Assuntos não relacionados aos dados da tela.",
        },
    }
}

/// Renders the glossary as one field-definition line per entry.
pub fn dictionary_context(dictionary: &[DictionaryEntry]) -> String {
    dictionary
        .iter()
        .map(|entry| {
            format!(
                "> CAMPO DE DADO: \"{}\" (Técnico: {}) -> O que é: {}",
                entry.label, entry.field, entry.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Headline figures inside [`DataSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    pub valor_total: f64,
    pub volume_processos: u64,
    pub ticket_medio: f64,
    pub categoria_dominante: String,
}

/// One sampled transaction, projected to business vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleTransaction {
    pub data: String,
    pub valor: f64,
    pub status_atual: String,
    pub solicitante_ou_fornecedor: String,
    pub categoria_ou_centro_custo: String,
    pub descricao_detalhada: String,
}

/// JSON summary of the current batch handed to the assistant as context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub contexto_negocio: String,
    pub metricas_principais: HeadlineMetrics,
    pub tendencia_temporal: Vec<TimelinePoint>,
    pub distribuicao_status: Vec<StatusSlice>,
    pub distribuicao_categoria: Vec<CategorySlice>,
    pub amostra_transacoes_relevantes: Vec<SampleTransaction>,
}

/// Builds the batch summary: headline metrics, the aggregate
/// distributions, and up to [`SAMPLE_LIMIT`] highest-value items.
pub fn build_summary(
    items: &[CanonicalItem],
    metrics: &KpiMetrics,
    context_name: &str,
) -> DataSummary {
    let mut ranked: Vec<&CanonicalItem> = items.iter().collect();
    ranked.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));

    let sample = ranked
        .into_iter()
        .take(SAMPLE_LIMIT)
        .map(|item| SampleTransaction {
            data: item.date.clone(),
            valor: item.value,
            status_atual: item.status.clone(),
            solicitante_ou_fornecedor: item.requester.clone(),
            categoria_ou_centro_custo: item.category.clone(),
            descricao_detalhada: item.description.clone(),
        })
        .collect();

    DataSummary {
        contexto_negocio: context_name.to_string(),
        metricas_principais: HeadlineMetrics {
            valor_total: metrics.total_value,
            volume_processos: metrics.total_processes,
            ticket_medio: metrics.average_value,
            categoria_dominante: metrics.top_category.clone(),
        },
        tendencia_temporal: metrics.timeline.clone(),
        distribuicao_status: metrics.status_distribution.clone(),
        distribuicao_categoria: metrics.category_distribution.clone(),
        amostra_transacoes_relevantes: sample,
    }
}

/// Renders the full system instruction for the assistant session.
pub fn system_instruction(
    module: &ModuleId,
    context_name: &str,
    dictionary: &[DictionaryEntry],
    summary: &DataSummary,
) -> String {
    let persona = persona_for(module);
    let dictionary_lines = dictionary_context(dictionary);
    let summary_json = serde_json::to_string_pretty(summary).unwrap_or_default();

    format!(
        "### IDENTIDADE E PROPÓSITO ###\n\
         VOCÊ É: {role}.\n\
         SEU FOCO: {focus}\n\
         SEU ESCOPO (HARD LIMIT): {scope}\n\
         O QUE VOCÊ NÃO FAZ: {forbidden}\n\
         \n\
         ### BASE DE CONHECIMENTO (DICIONÁRIO DE DADOS) ###\n\
         Utilize as definições abaixo para interpretar corretamente o que cada dado significa no contexto deste negócio específico:\n\
         {dictionary_lines}\n\
         \n\
         ### DADOS DO MOMENTO (CONTEXTO ATUAL) ###\n\
         {summary_json}\n\
         \n\
         ### DIRETRIZES DE COMPORTAMENTO (CONSULTORIA EXECUTIVA) ###\n\
         1. **BLOQUEIO DE ASSUNTO:** Se o usuário perguntar sobre algo fora do seu ESCOPO, responda: \"Como especialista em {context_name}, minha análise se restringe a este tema. Por favor, navegue até o módulo correspondente para essa análise.\"\n\
         2. **LINGUAGEM DE NEGÓCIO:** Nunca use termos técnicos de TI (JSON, Endpoint, String, Null). Use a terminologia do negócio definida no Dicionário.\n\
         3. **ANÁLISE, NÃO DESCRIÇÃO:** Não diga \"O valor subiu\". Explique o que o movimento indica e o que o impulsiona.\n\
         4. **VISÃO PREDITIVA:** Use os dados temporais para alertar sobre o futuro.\n\
         5. **AGREGUE VALOR:** Sempre adicione uma recomendação ao final, baseada na sua especialidade, mesmo que a resposta seja curta.\n\
         \n\
         ### FORMATO DE RESPOSTA ###\n\
         - Use **Negrito** para destacar valores e entidades importantes.\n\
         - Se a pergunta for simples, responda direto. Se for complexa, estruture em tópicos.\n\
         - Finalize com: \"**💡 Insight do Especialista:**\" (uma frase de impacto ou recomendação).",
        role = persona.role,
        focus = persona.focus,
        scope = persona.scope,
        forbidden = persona.forbidden,
        dictionary_lines = dictionary_lines,
        summary_json = summary_json,
        context_name = context_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxb_metrics::aggregate;
    use serde_json::Value;

    fn item(id: &str, value: f64, requester: &str) -> CanonicalItem {
        CanonicalItem {
            id: id.into(),
            date: "15/01/2024".into(),
            value,
            status: "Aprovado".into(),
            requester: requester.into(),
            category: "Geral".into(),
            description: "despesa".into(),
            raw: Value::Null,
        }
    }

    #[test]
    fn personas_are_module_specific() {
        assert!(persona_for(&ModuleId::Reimbursement).role.contains("Auditor"));
        assert!(persona_for(&ModuleId::Trip).role.contains("Viagens"));
        assert!(persona_for(&ModuleId::Invoice).role.contains("Tesouraria"));
        assert_eq!(
            persona_for(&ModuleId::Other("x".into())).role,
            "Consultor Executivo de Estratégia"
        );
    }

    #[test]
    fn dictionary_lines_render_label_field_and_description() {
        let dictionary = vec![DictionaryEntry {
            label: "Montante da Nota".into(),
            field: "VALOR_PEDIDO".into(),
            description: "Valor total da nota fiscal.".into(),
            ..Default::default()
        }];
        let text = dictionary_context(&dictionary);
        assert_eq!(
            text,
            "> CAMPO DE DADO: \"Montante da Nota\" (Técnico: VALOR_PEDIDO) -> O que é: Valor total da nota fiscal."
        );
    }

    #[test]
    fn summary_samples_highest_values_first_capped_at_limit() {
        let items: Vec<CanonicalItem> = (0..30)
            .map(|i| item(&i.to_string(), f64::from(i), "Ana"))
            .collect();
        let metrics = aggregate(&items);
        let summary = build_summary(&items, &metrics, "Solic. Reembolso");

        assert_eq!(summary.amostra_transacoes_relevantes.len(), SAMPLE_LIMIT);
        assert_eq!(summary.amostra_transacoes_relevantes[0].valor, 29.0);
        assert_eq!(summary.amostra_transacoes_relevantes[19].valor, 10.0);
        assert_eq!(summary.metricas_principais.volume_processos, 30);
    }

    #[test]
    fn summary_serializes_with_business_vocabulary() {
        let items = vec![item("1", 100.0, "Ana")];
        let metrics = aggregate(&items);
        let summary = build_summary(&items, &metrics, "Solic. Reembolso");
        let json = serde_json::to_value(&summary).expect("summary serializes");

        assert_eq!(json["contexto_negocio"], "Solic. Reembolso");
        assert_eq!(json["metricas_principais"]["valor_total"], 100.0);
        assert_eq!(
            json["amostra_transacoes_relevantes"][0]["solicitante_ou_fornecedor"],
            "Ana"
        );
    }

    #[test]
    fn system_instruction_embeds_persona_dictionary_and_summary() {
        let items = vec![item("1", 250.0, "Ana")];
        let metrics = aggregate(&items);
        let summary = build_summary(&items, &metrics, "Solic. Reembolso");
        let dictionary = vec![DictionaryEntry {
            label: "Colaborador".into(),
            field: "COLABORADOR".into(),
            description: "Quem solicitou o reembolso.".into(),
            ..Default::default()
        }];

        let instruction = system_instruction(
            &ModuleId::Reimbursement,
            "Solic. Reembolso",
            &dictionary,
            &summary,
        );

        assert!(instruction.contains("Auditor Sênior"));
        assert!(instruction.contains("CAMPO DE DADO: \"Colaborador\""));
        assert!(instruction.contains("\"valor_total\": 250.0"));
        assert!(instruction.contains("Como especialista em Solic. Reembolso"));
    }
}
