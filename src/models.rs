use serde::{Deserialize, Serialize};

// ============ Inbound Payloads ============

fn default_channel() -> Option<String> {
    Some("chatbot".to_string())
}

fn default_source() -> Option<String> {
    Some("helena".to_string())
}

/// Borrower identity sent by Helena to look up available offers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsultaRequest {
    /// Full name.
    pub nome: String,
    /// CPF in any punctuation; canonicalized to digits before use.
    pub cpf: String,
    /// Birth date as `dd/mm/aaaa`.
    pub data_nascimento: String,
    /// Months of employment with the current employer.
    #[serde(default)]
    pub meses_vinculo: Option<i64>,
    /// Declared income.
    #[serde(default)]
    pub renda: Option<f64>,
    /// Channel tag.
    #[serde(default = "default_channel")]
    pub canal: Option<String>,
    /// Source tag.
    #[serde(default = "default_source")]
    pub origem: Option<String>,
    /// Contact id on the conversational platform.
    #[serde(default)]
    pub id_contato: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub telefone: Option<String>,
}

/// Full applicant profile for the formalization workflow.
///
/// Field names are the lender's; the whole struct is forwarded as form data
/// to the personal-data step, so renaming a field changes the wire contract.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormalizarRequest {
    pub cpf: String,
    pub data_nascimento: String,
    pub renda: f64,
    pub sexo: String,
    pub opcao_valor: i64,
    pub valor_parcela: f64,
    pub prazo: i64,

    // ---- personal data and documents ----
    pub nome: String,
    pub estado_civil: String,
    pub rg: String,
    pub estado_rg: String,
    pub orgao_emissor: String,
    pub data_expedicao: String,
    pub estado_natural: String,
    pub cidade_natural: String,
    pub nacionalidade: String,

    // ---- contact and address ----
    pub celular: String,
    pub cep: String,
    pub endereco: String,
    pub numero: String,
    pub bairro: String,
    pub estado: String,
    pub cidade: String,
    pub nome_mae: String,
    pub nome_pai: String,
    pub valor_patrimonio: String,
    /// Literacy/impossibility flag as the lender expects it.
    pub cliente_iletrado_impossibilitado: String,

    // ---- banking / PIX ----
    pub tipo_conta: String,
    pub banco: String,
    pub agencia: String,
    pub conta: String,
    pub tipo_chave_pix: String,
    pub chave_pix: String,

    // ---- employment ----
    pub matricula: String,
    pub cnpj_empregador: String,
    pub data_admissao: String,
}

// ============ Domain Types ============

/// A normalized loan offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Offer description (`oferta`, falling back to `descricao`).
    pub oferta: Option<String>,
    /// Offer status (`resposta`, falling back to `situacao`).
    pub resposta: Option<String>,
}

/// Result of an offer lookup.
#[derive(Debug, Clone)]
pub struct OfferQueryResult {
    /// Canonical CPF actually sent to the lender.
    pub cpf: String,
    pub offers: Vec<Offer>,
}

/// One rate-table candidate returned by the available-operations lookup.
///
/// Values keep their lender text form so they can be forwarded unchanged
/// to the simulation step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    pub codigo_tabela: Option<String>,
    pub prazo: Option<String>,
    pub valor_liquido: Option<String>,
    pub contrato: Option<String>,
    pub parcela: Option<String>,
    pub coeficiente: Option<String>,
}

/// Outcome of a completed formalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalizationResult {
    pub proposal_code: String,
    pub formalization_url: Option<String>,
}

// ============ Outbound Responses ============

/// Response body of `POST /consulta-ofertas`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultaResponse {
    pub status: String,
    pub cpf: String,
    pub total_ofertas: usize,
    pub ofertas: Vec<Offer>,
}

impl From<OfferQueryResult> for ConsultaResponse {
    fn from(result: OfferQueryResult) -> Self {
        Self {
            status: "ok".to_string(),
            cpf: result.cpf,
            total_ofertas: result.offers.len(),
            ofertas: result.offers,
        }
    }
}

/// Response body of `POST /formalizar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormalizarResponse {
    pub status: String,
    pub mensagem: String,
    pub codigo: String,
    pub url_formalizacao: Option<String>,
}

impl From<FormalizationResult> for FormalizarResponse {
    fn from(result: FormalizationResult) -> Self {
        Self {
            status: "ok".to_string(),
            mensagem: "Proposal created and link sent.".to_string(),
            codigo: result.proposal_code,
            url_formalizacao: result.formalization_url,
        }
    }
}
