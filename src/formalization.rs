//! Loan formalization workflow.
//!
//! A linear chain of lender calls where each step's output is mandatory
//! input to the next:
//!
//! 1. Acquire a token.
//! 2. Fetch the eligible rate tables and pick the best one.
//! 3. `simulate`: yields `id_simulador`.
//! 4. `register`: personal data, yields `codigo_cliente`.
//! 5. `proposal`: yields `codigo` and `url_formalizacao`.
//! 6. `send link`: best-effort delivery of the signing link.
//!
//! Every step is a single attempt. A failure aborts the operation and earlier
//! lender-side state (a simulation without a proposal, say) is left as-is;
//! there is no compensating rollback.

use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::facta_client::{FactaClient, LenderReply};
use crate::models::{FormalizarRequest, FormalizationResult, RateTable};
use crate::normalizer::{canonical_cpf, extract_rate_tables, field_text, value_text};
use crate::table_selector::select_best_table;
use serde_json::{json, Value};

/// Fixed product/operation/agent/agreement configuration sent to the lender.
pub const PRODUCT_CONFIG: [(&str, &str); 4] = [
    ("produto", "D"),
    ("tipo_operacao", "13"),
    ("averbador", "10010"),
    ("convenio", "3"),
];

const FORMALIZATION_TYPE: &str = "DIG";
const DELIVERY_CHANNEL: &str = "Whatsapp";

/// The remote steps after table selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormalizationStep {
    Simulate,
    Register,
    Proposal,
    SendLink,
}

impl FormalizationStep {
    pub fn name(self) -> &'static str {
        match self {
            FormalizationStep::Simulate => "simulate",
            FormalizationStep::Register => "register",
            FormalizationStep::Proposal => "proposal",
            FormalizationStep::SendLink => "send_link",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            FormalizationStep::Simulate => "/proposta/etapa1-simulador",
            FormalizationStep::Register => "/proposta/etapa2-dados-pessoais",
            FormalizationStep::Proposal => "/proposta/etapa3-proposta-cadastro",
            FormalizationStep::SendLink => "/proposta/envio-link",
        }
    }

    fn failed(self, body: &str) -> AppError {
        AppError::StepFailed {
            step: self.name(),
            body: body.to_string(),
        }
    }

    /// Parses a step reply; a body that is not JSON fails the step with the raw text.
    fn parse(self, reply: &LenderReply) -> Result<Value, AppError> {
        let parsed = reply.json().ok_or_else(|| self.failed(&reply.body))?;
        if !reply.status.is_success() {
            tracing::warn!("Step '{}' answered {}: {}", self.name(), reply.status, reply.body);
        }
        Ok(parsed)
    }

    /// Reads the field this step must produce, failing the step if it is absent.
    fn require(self, reply: &LenderReply, parsed: &Value, field: &str) -> Result<String, AppError> {
        field_text(parsed, &[field])
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                tracing::warn!("Step '{}' reply lacks '{}': {}", self.name(), field, reply.body);
                self.failed(&reply.body)
            })
    }
}

// Workflow state. Each stage only carries what earlier steps have produced,
// so nothing can be read before the step that creates it has succeeded.

/// State after a successful simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulated {
    pub simulation_id: String,
}

/// State after personal data has been registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub simulation_id: String,
    pub client_code: String,
}

/// State after the proposal has been created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposed {
    pub proposal_code: String,
    pub formalization_url: Option<String>,
}

/// Query parameters of the available-operations lookup.
pub fn available_operations_params(
    application: &FormalizarRequest,
    cpf: &str,
) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = PRODUCT_CONFIG
        .iter()
        .map(|(key, value)| (*key, value.to_string()))
        .collect();

    params.extend([
        ("opcao_valor", application.opcao_valor.to_string()),
        ("valor_parcela", value_text(&json!(application.valor_parcela))),
        ("prazo", application.prazo.to_string()),
        ("cpf", cpf.to_string()),
        ("data_nascimento", application.data_nascimento.clone()),
        ("valor_renda", value_text(&json!(application.renda))),
    ]);

    params
}

/// Form body of the simulation step for the selected table.
///
/// `codigoTabela` and `prazo` are structurally required; the operation value
/// is the contract value, falling back to the net value, then zero.
pub fn simulation_form(
    application: &FormalizarRequest,
    cpf: &str,
    login_certificado: &str,
    table: &RateTable,
) -> Result<Vec<(String, String)>, AppError> {
    let table_code = table.codigo_tabela.clone().ok_or_else(|| {
        AppError::UpstreamProtocolError("selected rate table has no 'codigoTabela'".to_string())
    })?;
    let term = table.prazo.clone().ok_or_else(|| {
        AppError::UpstreamProtocolError(format!("rate table {} has no 'prazo'", table_code))
    })?;

    let operation_value = table
        .contrato
        .clone()
        .or_else(|| table.valor_liquido.clone())
        .unwrap_or_else(|| "0".to_string());
    let installment = table.parcela.clone().unwrap_or_else(|| "0".to_string());

    let mut form: Vec<(String, String)> = PRODUCT_CONFIG
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    form.extend([
        ("cpf".to_string(), cpf.to_string()),
        (
            "data_nascimento".to_string(),
            application.data_nascimento.clone(),
        ),
        ("login_certificado".to_string(), login_certificado.to_string()),
        ("codigo_tabela".to_string(), table_code),
        ("prazo".to_string(), term),
        ("valor_operacao".to_string(), operation_value),
        ("valor_parcela".to_string(), installment),
        (
            "coeficiente".to_string(),
            table.coeficiente.clone().unwrap_or_default(),
        ),
    ]);

    Ok(form)
}

/// Form body of the personal-data step: every application field, with the
/// canonical CPF and the simulation id.
pub fn registration_form(
    application: &FormalizarRequest,
    cpf: &str,
    simulated: &Simulated,
) -> Result<Vec<(String, String)>, AppError> {
    let profile = serde_json::to_value(application).map_err(|e| {
        AppError::InternalError(format!("Failed to serialize application: {}", e))
    })?;
    let Value::Object(fields) = profile else {
        return Err(AppError::InternalError(
            "application did not serialize to an object".to_string(),
        ));
    };

    let mut form: Vec<(String, String)> = fields
        .iter()
        .filter(|(key, _)| key.as_str() != "cpf")
        .map(|(key, value)| (key.clone(), value_text(value)))
        .collect();

    form.push(("id_simulador".to_string(), simulated.simulation_id.clone()));
    form.push(("cpf".to_string(), cpf.to_string()));

    Ok(form)
}

/// Form body of the proposal step.
pub fn proposal_form(registered: &Registered) -> Vec<(String, String)> {
    vec![
        ("codigo_cliente".to_string(), registered.client_code.clone()),
        ("id_simulador".to_string(), registered.simulation_id.clone()),
        (
            "tipo_formalizacao".to_string(),
            FORMALIZATION_TYPE.to_string(),
        ),
    ]
}

/// Form body of the link-delivery step.
pub fn send_link_form(proposed: &Proposed) -> Vec<(String, String)> {
    vec![
        ("codigo_af".to_string(), proposed.proposal_code.clone()),
        ("tipo_envio".to_string(), DELIVERY_CHANNEL.to_string()),
    ]
}

/// Drives one formalization against the lender.
pub struct Formalizer<'a> {
    client: &'a FactaClient,
    login_certificado: &'a str,
}

impl<'a> Formalizer<'a> {
    pub fn new(client: &'a FactaClient, config: &'a Config) -> Self {
        Self {
            client,
            login_certificado: &config.login_certificado,
        }
    }

    /// Runs the whole workflow and returns the proposal code and signing URL.
    ///
    /// The token acquired first is reused for every later call.
    pub async fn formalize(
        &self,
        application: &FormalizarRequest,
    ) -> Result<FormalizationResult, AppError> {
        let token = self
            .client
            .acquire_token()
            .await
            .context("formalization: token exchange")?;
        let cpf = canonical_cpf(&application.cpf);
        tracing::info!("Starting formalization for CPF {}", cpf);

        let tables = self.fetch_tables(&token, application, &cpf).await?;
        let table = select_best_table(&tables)?;
        tracing::info!(
            "Selected rate table {:?} (net value {:?}) out of {}",
            table.codigo_tabela,
            table.valor_liquido,
            tables.len()
        );

        let simulated = self.simulate(&token, application, &cpf, table).await?;
        let registered = self.register(&token, application, &cpf, simulated).await?;
        let proposed = self.create_proposal(&token, registered).await?;
        self.send_link(&token, &proposed).await;

        Ok(FormalizationResult {
            proposal_code: proposed.proposal_code,
            formalization_url: proposed.formalization_url,
        })
    }

    async fn fetch_tables(
        &self,
        token: &str,
        application: &FormalizarRequest,
        cpf: &str,
    ) -> Result<Vec<RateTable>, AppError> {
        let params = available_operations_params(application, cpf);
        let body = self
            .client
            .fetch_available_operations(token, &params)
            .await
            .context("formalization: available operations")?;

        let tables = extract_rate_tables(&body);
        if tables.is_empty() {
            return Err(AppError::NoEligibleTable(
                "no rate table available for the given parameters".to_string(),
            ));
        }
        Ok(tables)
    }

    async fn simulate(
        &self,
        token: &str,
        application: &FormalizarRequest,
        cpf: &str,
        table: &RateTable,
    ) -> Result<Simulated, AppError> {
        let step = FormalizationStep::Simulate;
        let form = simulation_form(application, cpf, self.login_certificado, table)?;
        let reply = self.client.post_form(token, step.path(), &form).await?;

        let parsed = step.parse(&reply)?;
        let simulation_id = step.require(&reply, &parsed, "id_simulador")?;
        tracing::info!("✓ Simulation created: {}", simulation_id);

        Ok(Simulated { simulation_id })
    }

    async fn register(
        &self,
        token: &str,
        application: &FormalizarRequest,
        cpf: &str,
        simulated: Simulated,
    ) -> Result<Registered, AppError> {
        let step = FormalizationStep::Register;
        let form = registration_form(application, cpf, &simulated)?;
        let reply = self.client.post_form(token, step.path(), &form).await?;

        let parsed = step.parse(&reply)?;
        let client_code = step.require(&reply, &parsed, "codigo_cliente")?;
        tracing::info!("✓ Personal data registered, client code {}", client_code);

        Ok(Registered {
            simulation_id: simulated.simulation_id,
            client_code,
        })
    }

    async fn create_proposal(
        &self,
        token: &str,
        registered: Registered,
    ) -> Result<Proposed, AppError> {
        let step = FormalizationStep::Proposal;
        let form = proposal_form(&registered);
        let reply = self.client.post_form(token, step.path(), &form).await?;

        let parsed = step.parse(&reply)?;
        let proposal_code = step.require(&reply, &parsed, "codigo")?;
        let formalization_url = field_text(&parsed, &["url_formalizacao"]);
        if formalization_url.is_none() {
            tracing::warn!("Proposal {} created without a formalization URL", proposal_code);
        }
        tracing::info!("✓ Proposal created: {}", proposal_code);

        Ok(Proposed {
            proposal_code,
            formalization_url,
        })
    }

    /// Delivery is best-effort: any failure is logged and never surfaced.
    async fn send_link(&self, token: &str, proposed: &Proposed) {
        let step = FormalizationStep::SendLink;
        let form = send_link_form(proposed);

        match self.client.post_form(token, step.path(), &form).await {
            Ok(reply) if reply.status.is_success() => {
                tracing::info!("✓ Formalization link sent for proposal {}", proposed.proposal_code)
            }
            Ok(reply) => tracing::warn!(
                "Link delivery for proposal {} answered {}: {}",
                proposed.proposal_code,
                reply.status,
                reply.body
            ),
            Err(e) => tracing::warn!(
                "Link delivery for proposal {} failed: {}",
                proposed.proposal_code,
                e
            ),
        }
    }
}
