// End-to-end tests for the Narrator Backend HTTP API
//
// Each test gets its own server on an ephemeral port, its own temporary
// output directory and its own in-memory TTS provider, so tests run in
// parallel without sharing state.

mod helpers;
mod test_audio;
mod test_synthesize;
