/*!
 * # transguard - guarded text translation with AI
 *
 * A Rust library that translates short texts through a safety-gated,
 * quality-checked workflow backed by a generative model.
 *
 * ## Features
 *
 * - Input normalization and best-effort source language detection
 * - Safety classification (personal data, harmful content, prompt injection)
 *   with fast deterministic rules in front of the model
 * - Translation with a binary quality gate and a bounded corrective retry loop
 * - Audit entries for blocked requests that never contain the input text
 * - Generative backends:
 *   - Ollama (local LLM)
 *   - OpenAI API and OpenAI-compatible servers (LM Studio)
 *   - Anthropic API
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `workflow`: The stage graph and everything it runs:
 *   - `workflow::graph`: Graph builder, compiler and runner
 *   - `workflow::stages`: The nine workflow stages
 *   - `workflow::rules`: Deterministic safety rules
 *   - `workflow::state`: The shared state record
 * - `translation_service`: Request/response surface over the workflow
 * - `language_utils`: Language code normalization and display names
 * - `providers`: Client implementations for the generative capability:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Scripted capability for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

pub mod app_config;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod translation_service;
pub mod workflow;

pub use translation_service::{TranslationRequest, TranslationResponse, TranslationService};
